//! Helper macro for declaring port error enums.
//!
//! Each variant gets a snake-case constructor whose parameters accept
//! `impl Into<FieldType>`, so adapters can write
//! `InventoryStoreError::query(err.to_string())`.

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
    use rstest::rstest;

    define_port_error! {
        pub enum SampleStoreError {
            Offline => "store offline",
            Busy { message: String } => "busy: {message}",
            Exhausted { attempts: u32 } => "gave up after {attempts} attempts",
            Rejected { field: String, attempts: u32 } => "{field} rejected after {attempts}",
        }
    }

    #[rstest]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(SampleStoreError::offline().to_string(), "store offline");
    }

    #[rstest]
    fn string_fields_accept_str() {
        assert_eq!(SampleStoreError::busy("lock held").to_string(), "busy: lock held");
    }

    #[rstest]
    fn non_string_fields_keep_their_type() {
        assert_eq!(
            SampleStoreError::exhausted(3_u32),
            SampleStoreError::Exhausted { attempts: 3 }
        );
        assert_eq!(
            SampleStoreError::rejected("mac_address", 2_u32).to_string(),
            "mac_address rejected after 2"
        );
    }
}
