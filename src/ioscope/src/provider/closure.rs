use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use crate::container::injector::{
    CallContext, ContextForwardingInjectorProxy, Injector, InjectorError, TypedInjector,
};
use crate::container::{Managed, SharedManaged};
use crate::key;
use crate::provider::{factory_error, TypedProvider, TypedSharedProvider};

/// A function whose arguments are all resolved from an [`Injector`].
///
/// Any `Fn(A1, ..., An) -> Result<T, E>` with `n <= 8` where every `Ai` is
/// [`Managed`] is a [`Closure`]. Each argument is resolved by its unqualified
/// key, i.e. `key::of::<Ai>()`; use a [`RawClosure`] when some dependency is
/// qualified.
pub trait Closure<Args>: Send + Sync + 'static {
    type Output: Managed;

    /// Resolves the arguments and calls `self`.
    ///
    /// # Errors
    ///
    /// Returns the error raised while resolving an argument, or the error
    /// returned by `self` converted by the rules of [`Provider`].
    ///
    /// [`Provider`]: crate::provider::Provider
    fn call_with(
        &self,
        injector: &dyn Injector,
        context: &CallContext<'_>,
    ) -> Result<Self::Output, InjectorError>;
}

macro_rules! impl_closure {
    ($($arg:ident),*) => {
        #[allow(non_snake_case, unused_variables)]
        impl<F, T, E, $($arg,)*> Closure<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> Result<T, E> + Send + Sync + 'static,
            T: Managed,
            E: Into<Box<dyn Error + Send + Sync>>,
            $($arg: Managed,)*
        {
            type Output = T;

            fn call_with(
                &self,
                injector: &dyn Injector,
                context: &CallContext<'_>,
            ) -> Result<Self::Output, InjectorError> {
                $(let $arg = injector.get(key::of::<$arg>())?;)*
                self($($arg),*).map_err(|err| factory_error(context, err))
            }
        }
    };
}

impl_closure!();
impl_closure!(A1);
impl_closure!(A1, A2);
impl_closure!(A1, A2, A3);
impl_closure!(A1, A2, A3, A4);
impl_closure!(A1, A2, A3, A4, A5);
impl_closure!(A1, A2, A3, A4, A5, A6);
impl_closure!(A1, A2, A3, A4, A5, A6, A7);
impl_closure!(A1, A2, A3, A4, A5, A6, A7, A8);

/// A function which receives the [`Injector`] itself and resolves whatever
/// it needs.
///
/// The error type is free. Returning an [`InjectorError`] obtained from the
/// injector, e.g. through `?` on a `Box<dyn Error + Send + Sync>`, keeps its
/// meaning; any other error is reported as
/// [`InjectorError::ObjectConstruction`].
pub trait RawClosure: Send + Sync + 'static {
    type Output: Managed;

    type Error: Into<Box<dyn Error + Send + Sync>>;

    fn call(&self, injector: &dyn Injector) -> Result<Self::Output, Self::Error>;
}

impl<F, T, E> RawClosure for F
where
    F: Fn(&dyn Injector) -> Result<T, E> + Send + Sync + 'static,
    T: Managed,
    E: Into<Box<dyn Error + Send + Sync>>,
{
    type Output = T;

    type Error = E;

    fn call(&self, injector: &dyn Injector) -> Result<Self::Output, Self::Error> {
        self(injector)
    }
}

/// A [`Provider`] backed by a [`Closure`].
///
/// # Examples
///
/// ```rust
/// # use std::convert::Infallible;
/// # use std::sync::Arc;
/// # use ioscope::provider::ClosureProvider;
/// struct Repository {
///     url: Arc<String>,
/// }
///
/// let provider = ClosureProvider::new(|url: Arc<String>| Ok::<_, Infallible>(Repository { url }));
/// ```
///
/// [`Provider`]: crate::provider::Provider
pub struct ClosureProvider<C, Args> {
    closure: C,
    _marker: PhantomData<fn(Args)>,
}

impl<C, Args> ClosureProvider<C, Args>
where
    C: Closure<Args>,
{
    pub fn new(closure: C) -> Self {
        Self {
            closure,
            _marker: PhantomData,
        }
    }
}

impl<C, Args> Debug for ClosureProvider<C, Args> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClosureProvider").finish_non_exhaustive()
    }
}

impl<C, Args> TypedProvider for ClosureProvider<C, Args>
where
    C: Closure<Args>,
    Args: 'static,
{
    type Output = C::Output;

    fn provide<I>(
        &self,
        injector: &I,
        context: &CallContext<'_>,
    ) -> Result<Self::Output, InjectorError>
    where
        I: TypedInjector + ?Sized,
    {
        let injector = ContextForwardingInjectorProxy::new(injector, context);
        self.closure.call_with(&injector, context)
    }
}

impl<C, Args> TypedSharedProvider for ClosureProvider<C, Args>
where
    C: Closure<Args, Output: SharedManaged>,
    Args: 'static,
{
}

/// A [`Provider`] backed by a [`RawClosure`].
///
/// [`Provider`]: crate::provider::Provider
pub struct RawClosureProvider<C> {
    closure: C,
}

impl<C> RawClosureProvider<C>
where
    C: RawClosure,
{
    pub fn new(closure: C) -> Self {
        Self { closure }
    }
}

impl<C> Debug for RawClosureProvider<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RawClosureProvider").finish_non_exhaustive()
    }
}

impl<C> TypedProvider for RawClosureProvider<C>
where
    C: RawClosure,
{
    type Output = C::Output;

    fn provide<I>(
        &self,
        injector: &I,
        context: &CallContext<'_>,
    ) -> Result<Self::Output, InjectorError>
    where
        I: TypedInjector + ?Sized,
    {
        let injector = ContextForwardingInjectorProxy::new(injector, context);
        self.closure
            .call(&injector)
            .map_err(|err| factory_error(context, err))
    }
}

impl<C> TypedSharedProvider for RawClosureProvider<C> where C: RawClosure<Output: SharedManaged> {}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::Arc;

    use crate::container::injector::MockInjector;
    use crate::provider::SharedProvider;

    use super::*;

    #[derive(Debug)]
    struct Unavailable;

    impl std::fmt::Display for Unavailable {
        fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
            write!(f, "service unavailable")
        }
    }

    impl Error for Unavailable {}

    #[test]
    fn closure_provider_provide_succeeds() {
        let mut injector = MockInjector::new();
        injector.expect_dyn_get().never();
        injector
            .expect_dyn_get_dependency()
            .times(2)
            .returning(|_, _| Ok(Box::new(20u16)));

        let provider = ClosureProvider::new(|port: u16| Ok::<_, Infallible>(format!("localhost:{port}")));
        let service = key::of::<String>();

        let res = provider.provide(&injector, &CallContext::new(&service));
        assert_eq!(res.unwrap(), "localhost:20");
        let res = provider.provide(&injector, &CallContext::new(&service));
        assert_eq!(res.unwrap(), "localhost:20");
    }

    #[test]
    fn closure_provider_provide_succeeds_without_arguments() {
        let injector = MockInjector::new();
        let provider = ClosureProvider::new(|| Ok::<_, Infallible>(Arc::new(7i64)));

        let res = provider.provide(&injector, &CallContext::new(&key::of::<Arc<i64>>()));
        assert_eq!(*res.unwrap(), 7);
        assert_is_shared_provider(&provider);
    }

    #[test]
    fn closure_provider_provide_fails_when_closure_fails() {
        let injector = MockInjector::new();
        let provider = ClosureProvider::new(|| Err::<i32, _>(Unavailable));

        let res = provider.provide(&injector, &CallContext::new(&key::of::<i32>()));
        let Err(InjectorError::ObjectConstruction { source, .. }) = res else {
            panic!("a failing closure should report `ObjectConstruction`");
        };
        assert!(source.downcast_ref::<Unavailable>().is_some());
    }

    #[test]
    fn closure_provider_provide_fails_when_argument_not_found() {
        let mut injector = MockInjector::new();
        injector.expect_dyn_get_dependency().returning(|key, _| {
            Err(InjectorError::NotFound {
                key: key.dyn_clone(),
            })
        });
        let provider = ClosureProvider::new(|_: u16, _: bool| Ok::<_, Infallible>(0i32));

        let res = provider.provide(&injector, &CallContext::new(&key::of::<i32>()));
        assert!(matches!(res, Err(InjectorError::NotFound { .. })));
    }

    #[test]
    fn raw_closure_provider_provide_succeeds() {
        let mut injector = MockInjector::new();
        injector
            .expect_dyn_get_dependency()
            .times(1)
            .returning(|_, _| Ok(Box::new("primary")));

        let provider = RawClosureProvider::new(|injector: &dyn Injector| {
            let name: &'static str = injector.get(key::named("database"))?;
            Ok::<_, InjectorError>(Arc::new(name.to_uppercase()))
        });

        let res = provider.provide(&injector, &CallContext::new(&key::of::<Arc<String>>()));
        assert_eq!(res.unwrap().as_str(), "PRIMARY");
        assert_is_shared_provider(&provider);
    }

    #[test]
    fn raw_closure_provider_provide_fails_when_dependency_is_cyclic() {
        let mut injector = MockInjector::new();
        injector.expect_dyn_get_dependency().returning(|key, _| {
            Err(InjectorError::CyclicDependency {
                key: key.dyn_clone(),
            })
        });

        let provider = RawClosureProvider::new(|injector: &dyn Injector| {
            let value: i32 = injector.get(key::of())?;
            Ok::<_, Box<dyn Error + Send + Sync>>(value)
        });

        let res = provider.provide(&injector, &CallContext::new(&key::of::<i32>()));
        assert!(matches!(res, Err(InjectorError::CyclicDependency { .. })));
    }

    fn assert_is_shared_provider(_: &dyn SharedProvider) {}
}
