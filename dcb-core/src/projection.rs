//! Folds a stream of persisted events into application state (spec C5).
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::event::{Cursor, Event, PersistedEvent};

/// A fold step: mutates `state` in place in response to one event, and
/// returns whether it handled the event (purely informational; all
/// projectors in a call see every event, matching spec's "one state value
/// per projection call").
pub trait Projector<S> {
    fn apply(&self, state: &mut S, event: &dyn Event);
}

impl<S, F> Projector<S> for F
where
    F: Fn(&mut S, &dyn Event),
{
    fn apply(&self, state: &mut S, event: &dyn Event) {
        self(state, event)
    }
}

/// Folds `stream` into `state` by calling every projector for every event,
/// in stream order, returning the cursor of the last event seen (or `None`
/// if the stream was empty).
pub async fn project<E, Err, S>(
    mut stream: BoxStream<'_, Result<PersistedEvent<E>, Err>>,
    state: &mut S,
    projectors: &[Box<dyn Projector<S> + Send + Sync>],
) -> Result<Option<Cursor>, Err>
where
    E: Event,
{
    let mut last_cursor = None;
    while let Some(item) = stream.next().await {
        let persisted = item?;
        last_cursor = Some(persisted.cursor());
        for projector in projectors {
            projector.apply(state, &persisted.event as &dyn Event);
        }
    }
    Ok(last_cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagSet;
    use futures::stream;

    #[derive(Clone)]
    struct Counted(&'static str);

    impl Event for Counted {
        fn event_type(&self) -> &'static str {
            self.0
        }
        fn tags(&self) -> TagSet {
            TagSet::new()
        }
    }

    #[tokio::test]
    async fn it_folds_every_event_through_every_projector() {
        let events = vec![
            Ok::<_, std::convert::Infallible>(PersistedEvent::new(
                Cursor::new(1, chrono::Utc::now(), 1),
                Counted("A"),
            )),
            Ok(PersistedEvent::new(
                Cursor::new(2, chrono::Utc::now(), 1),
                Counted("B"),
            )),
        ];
        let boxed: BoxStream<'_, _> = Box::pin(stream::iter(events));

        let mut count = 0usize;
        let projectors: Vec<Box<dyn Projector<usize> + Send + Sync>> =
            vec![Box::new(|state: &mut usize, _event: &dyn Event| *state += 1)];

        let cursor = project(boxed, &mut count, &projectors).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(cursor.unwrap().position, 2);
    }
}
