//! Attribute change listeners.
use crate::attribute::AttributeChanged;
use crate::tag::Tag;

/// Callback fired on every real value change.
pub type AttributeListener = Box<dyn FnMut(&AttributeChanged) + Send>;

/// Identifies a subscription for [`crate::GameplayState::unsubscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Subscription {
    id: ListenerId,
    /// `None` listens to every attribute.
    tag: Option<Tag>,
    listener: AttributeListener,
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl ListenerRegistry {
    pub(crate) fn subscribe(
        &mut self,
        tag: Option<Tag>,
        listener: AttributeListener,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, tag, listener });
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| subscription.id != id);
        self.subscriptions.len() != before
    }

    /// Drops subscriptions bound to a removed attribute.
    pub(crate) fn remove_for(&mut self, tag: &Tag) {
        self.subscriptions
            .retain(|subscription| subscription.tag.as_ref() != Some(tag));
    }

    pub(crate) fn emit(&mut self, change: &AttributeChanged) {
        for subscription in &mut self.subscriptions {
            let interested = subscription
                .tag
                .as_ref()
                .is_none_or(|tag| *tag == change.tag);
            if interested {
                (subscription.listener)(change);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.subscriptions.len()
    }
}
