//! Marker types used to distinguish [`DateTimeOf`] kinds.
//!
//! [`DateTimeOf`]: crate::DateTimeOf

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing a departure (start of a trip).
#[derive(Clone, Copy, Debug)]
pub struct Departure;

/// Marker type describing a completion (end of a trip).
#[derive(Clone, Copy, Debug)]
pub struct Completion;

/// Marker type describing an expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
