//! Records addressed by a stable, typed id.

/// A record whose identity survives every state change.
pub trait Entity {
    /// Lower-case noun used in log fields and error messages (`"product"`).
    const KIND: &'static str;

    type Id: Copy + Ord + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> Self::Id;
}
