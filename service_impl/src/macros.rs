/// Declares the dependency trait and struct for one service implementation,
/// mirroring the DI boilerplate used throughout this crate: a generic
/// `$service_name<Deps>` holding `Arc<Deps::Field>` per listed dependency,
/// plus a `$dependencies` trait fixing `Context`/`Transaction`.
#[macro_export]
macro_rules! gen_service_impl {
    (
        struct $service_name:ident : $trait:path = $dependencies:ident {
            $($field_name:ident: $field_type:path = $field_attr:ident),* $(,)?
        }
    ) => {
        pub trait $dependencies {
            type Context: Send + Sync + Clone + PartialEq + Eq + std::fmt::Debug + 'static;
            type Transaction: dao::Transaction + Send + Sync + Clone + std::fmt::Debug + 'static;
            $(
                type $field_name: $field_type + Sync + Send;
            )*
        }

        pub struct $service_name<Deps: $dependencies> {
            $(
                pub $field_attr: std::sync::Arc<Deps::$field_name>,
            )*
        }

        impl<Deps: $dependencies> $service_name<Deps> {
            pub fn new($($field_attr: std::sync::Arc<Deps::$field_name>),*) -> Self {
                Self {
                    $($field_attr),*
                }
            }
        }
    };
}
