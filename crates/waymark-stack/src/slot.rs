/// Default pipeline stages, in execution order
///
/// Slots are the fixed pipeline stages cross-cutting middleware can occupy.
/// The set of stages is configuration (see [`SlotOrder`]); their relative
/// order is fixed once configured.
pub const DEFAULT_SLOTS: [&str; 8] = [
    "errorHandler",
    "auth",
    "params",
    "validateParams",
    "bodyparser",
    "payload",
    "validatePayload",
    "validateResponse",
];

/// Ordered set of recognized slot names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOrder {
    slots: Vec<String>,
}

impl SlotOrder {
    /// Builds an order from slot names; repeated names keep their first position
    ///
    /// # Examples
    ///
    /// ```
    /// use waymark_stack::SlotOrder;
    ///
    /// let order = SlotOrder::new(["auth", "params", "auth"]);
    /// assert_eq!(order.position("params"), Some(1));
    /// assert_eq!(order.len(), 2);
    /// assert!(!order.contains("bodyparser"));
    /// ```
    pub fn new<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order: Vec<String> = Vec::new();
        for slot in slots {
            let slot = slot.into();
            if !order.contains(&slot) {
                order.push(slot);
            }
        }
        Self { slots: order }
    }

    /// Pipeline position of a slot, `None` for unrecognized names
    pub fn position(&self, slot: &str) -> Option<usize> {
        self.slots.iter().position(|s| s == slot)
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.position(slot).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for SlotOrder {
    fn default() -> Self {
        Self::new(DEFAULT_SLOTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order() {
        let order = SlotOrder::default();
        assert_eq!(order.position("errorHandler"), Some(0));
        assert!(order.position("params") < order.position("validateParams"));
        assert!(order.position("payload") < order.position("validatePayload"));
        assert_eq!(order.iter().last(), Some("validateResponse"));
    }

    #[test]
    fn test_unknown_slot() {
        assert_eq!(SlotOrder::default().position("rateLimit"), None);
    }
}
