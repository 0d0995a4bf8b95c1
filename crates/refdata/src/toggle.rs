// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::{HashMap, HashSet};

use futures::{FutureExt, future};

use crate::{Error, ResolveFuture, Resolver};

/// A resolver that is either switched on or off.
///
/// `Inactive` answers every lookup, even an empty one, with [`Error::Unavailable`].
///
/// ```
/// use std::collections::HashSet;
/// use refdata::{Error, Resolver, Toggle};
///
/// let off: Toggle<std::sync::Arc<dyn Resolver<u32, u32>>> = Toggle::Inactive;
/// assert!(matches!(off.get(HashSet::from([1])), Err(Error::Unavailable)));
/// ```
#[derive(Debug, Clone)]
pub enum Toggle<R> {
    /// Lookups are delegated to the wrapped resolver.
    Active(R),
    /// Lookups fail with [`Error::Unavailable`].
    Inactive,
}

impl<R> Toggle<R> {
    /// Returns `true` if lookups reach a resolver.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Returns the wrapped resolver, if active.
    #[must_use]
    pub fn as_active(&self) -> Option<&R> {
        match self {
            Self::Active(r) => Some(r),
            Self::Inactive => None,
        }
    }
}

impl<R> From<Option<R>> for Toggle<R> {
    fn from(value: Option<R>) -> Self {
        value.map_or(Self::Inactive, Self::Active)
    }
}

impl<K, V, R> Resolver<K, V> for Toggle<R>
where
    K: Send + 'static,
    V: Send + 'static,
    R: Resolver<K, V>,
{
    fn future(&self, keys: HashSet<K>) -> ResolveFuture<K, V> {
        match self {
            Self::Active(r) => r.future(keys),
            Self::Inactive => future::ready(Err(Error::Unavailable)).boxed(),
        }
    }

    fn get(&self, keys: HashSet<K>) -> crate::Result<HashMap<K, V>> {
        match self {
            Self::Active(r) => r.get(keys),
            Self::Inactive => Err(Error::Unavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant;

    impl Resolver<u8, u8> for Constant {
        fn future(&self, keys: HashSet<u8>) -> ResolveFuture<u8, u8> {
            future::ready(Ok(keys.into_iter().map(|k| (k, 0)).collect())).boxed()
        }
    }

    #[test]
    fn active_delegates() {
        let toggle = Toggle::Active(Constant);
        assert!(toggle.is_active());
        assert_eq!(toggle.get(HashSet::from([5])).unwrap(), HashMap::from([(5, 0)]));
        assert_eq!(
            futures::executor::block_on(toggle.future(HashSet::from([6]))).unwrap(),
            HashMap::from([(6, 0)])
        );
    }

    #[test]
    fn inactive_is_unavailable() {
        let toggle: Toggle<Constant> = Toggle::Inactive;
        assert!(!toggle.is_active());
        assert!(matches!(toggle.get(HashSet::new()), Err(Error::Unavailable)));
        assert!(matches!(
            futures::executor::block_on(toggle.future(HashSet::from([1]))),
            Err(Error::Unavailable)
        ));
    }

    #[test]
    fn from_option() {
        assert!(Toggle::from(Some(Constant)).as_active().is_some());
        assert!(Toggle::<Constant>::from(None).as_active().is_none());
    }
}
