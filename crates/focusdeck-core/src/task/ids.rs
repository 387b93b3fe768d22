macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }

            /// First eight hex digits, used for display and prefix lookup.
            pub fn short(&self) -> String {
                self.0.simple().to_string()[..8].to_string()
            }

            /// Whether the id's hyphen-free hex form starts with `prefix`.
            pub fn matches_prefix(&self, prefix: &str) -> bool {
                let wanted = prefix.trim().replace('-', "").to_ascii_lowercase();
                !wanted.is_empty() && self.0.simple().to_string().starts_with(&wanted)
            }
        }

        // Documents written before ids existed get fresh ones on load.
        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                ::uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

pub(crate) use opaque_id;

opaque_id!(
    /// Stable identifier of a task.
    TaskId
);
opaque_id!(
    /// Stable identifier of a group (project).
    GroupId
);
