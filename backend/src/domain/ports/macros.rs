//! Macro generating port error enums with snake_case constructors.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructor generation for port error enums.
    define_port_error! {
        pub enum SamplePortError {
            Missing { path: String } => "missing: {path}",
            Quota { limit: u32 } => "quota: {limit}",
            Rejected { reason: String, status: u16 } => "rejected: {reason} ({status})",
            Closed => "closed",
        }
    }

    #[test]
    fn string_fields_accept_str() {
        let err = SamplePortError::missing("courses/c1");
        assert_eq!(err.to_string(), "missing: courses/c1");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        let err = SamplePortError::quota(42_u32);
        assert_eq!(err.to_string(), "quota: 42");
    }

    #[test]
    fn mixed_fields_are_supported() {
        let err = SamplePortError::rejected("unregistered", 404_u16);
        assert_eq!(err.to_string(), "rejected: unregistered (404)");
    }

    #[test]
    fn unit_variants_get_constructors() {
        assert_eq!(SamplePortError::closed(), SamplePortError::Closed);
    }
}
