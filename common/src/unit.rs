//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// Marker type describing the start of an entity.
#[derive(Clone, Copy, Debug)]
pub struct Start;

/// Marker type describing the end of an entity.
#[derive(Clone, Copy, Debug)]
pub struct End;
