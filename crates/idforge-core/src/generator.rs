/// Trait for in-process identifier generators.
///
/// Implementations own their state and serialize access internally, so a
/// single instance can be shared across threads by reference.
pub trait IdGenerator: Send + Sync {
    type Id;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Generates the next identifier.
    ///
    /// Successive successful calls on one instance return strictly
    /// increasing identifiers as long as the clock does not move backwards.
    fn generate(&self) -> Result<Self::Id, Self::Error>;
}
