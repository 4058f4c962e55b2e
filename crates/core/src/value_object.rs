//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A
/// `Volume` of 450 ml equals any other `Volume` of 450 ml; a `BloodType::OPositive`
/// is interchangeable with every other `O+`.
///
/// ```ignore
/// use hemolink_core::{ValueObject, Volume};
///
/// let a = Volume::from_millilitres(450);
/// let b = Volume::from_millilitres(450);
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
