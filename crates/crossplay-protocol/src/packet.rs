use std::any::Any;
use std::fmt::Debug;

/// A decoded packet, identified at dispatch time by its concrete type.
pub trait Packet: Any + Debug + Send {
    fn as_any(&self) -> &dyn Any;

    /// Short type name used in logs.
    fn name(&self) -> &'static str;
}

/// Implements [`Packet`] for a list of concrete packet structs.
#[macro_export]
macro_rules! impl_packet {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Packet for $ty {
                fn as_any(&self) -> &dyn ::std::any::Any {
                    self
                }

                fn name(&self) -> &'static str {
                    stringify!($ty)
                }
            }
        )*
    };
}

/// Builds a packet enum with one variant per struct and `From` conversions.
macro_rules! packet_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            $($variant($variant),)*
        }

        $(
            impl From<$variant> for $name {
                fn from(packet: $variant) -> Self {
                    $name::$variant(packet)
                }
            }
        )*

        impl $name {
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant(_) => stringify!($variant),)*
                }
            }
        }
    };
}

pub(crate) use packet_enum;
