/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn FnMut(&T)>;

/// A list of "snapshot changed" callbacks.
///
/// Callbacks run synchronously, in subscription order, on the thread that
/// calls `notify`.
pub struct Subscribers<T: ?Sized> {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T: ?Sized> Default for Subscribers<T> {
    fn default() -> Self {
        Subscribers {
            next_id: 0,
            callbacks: Vec::new(),
        }
    }
}

impl<T: ?Sized> Subscribers<T> {
    pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sid, _)| *sid != id);
        self.callbacks.len() != before
    }

    pub fn notify(&mut self, snapshot: &T) {
        for (_, callback) in &mut self.callbacks {
            callback(snapshot);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<T: ?Sized> std::fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}
