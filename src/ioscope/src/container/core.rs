use std::any::TypeId;
use std::collections::HashMap;
use std::mem;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use oneshot::{Receiver, Sender};
use parking_lot::{RwLock, RwLockWriteGuard};

use crate::container::disposal::{self, Disposal};
use crate::container::injector::{CallContext, Injector, InjectorError, ObjectMap};
use crate::container::registry::{ProviderEntry, ProviderKind, ProviderMap};
use crate::container::{
    ContainerOptions, DisposeError, Managed, ScopeId, ScopeLevel, ScopeState, SharedManaged,
};
use crate::dispose::Disposer;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::{Provider, SharedProvider};

/// The state shared by every handle of a container or of one of its scopes.
///
/// The core of a container is the root; the core of a scope has the root as
/// its parent. Each core caches the shared objects it owns: the root owns
/// singletons and the scoped objects of the implicit root scope, while a
/// scope owns its scoped objects.
pub struct ContainerCore {
    parent: Option<Arc<Self>>,
    providers: Arc<ProviderMap>,
    options: Arc<ContainerOptions>,
    level: ScopeLevel,
    managed: RwLock<SharedManagedObjectData>,
}

impl ContainerCore {
    pub fn new_root(providers: ProviderMap, options: ContainerOptions) -> Self {
        Self::new_impl(None, Arc::new(providers), Arc::new(options), ScopeLevel::Root)
    }

    pub fn new_child(parent: Arc<Self>, id: ScopeId) -> Self {
        let providers = Arc::clone(&parent.providers);
        let options = Arc::clone(&parent.options);
        let core = Self::new_impl(Some(parent), providers, options, ScopeLevel::Child(id));
        tracing::debug!(scope = %core.level, "scope is opened");
        core
    }

    fn new_impl(
        parent: Option<Arc<Self>>,
        providers: Arc<ProviderMap>,
        options: Arc<ContainerOptions>,
        level: ScopeLevel,
    ) -> Self {
        Self {
            parent,
            providers,
            options,
            level,
            managed: RwLock::new(SharedManagedObjectData::new()),
        }
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    pub fn state(&self) -> ScopeState {
        self.managed.read().state
    }

    /// Marks the core as closed, then disposes the disposable objects it owns
    /// from the most recently created one.
    pub fn close(&self) -> Result<(), DisposeError> {
        let (disposals, objects) = {
            let mut managed = self.managed.write();
            if managed.state == ScopeState::Closed {
                return Err(DisposeError::AlreadyClosed { scope: self.level });
            }
            managed.state = ScopeState::Closed;
            (
                mem::take(&mut managed.disposals),
                mem::take(&mut managed.objects),
            )
        };

        tracing::debug!(
            scope = %self.level,
            objects = objects.len(),
            disposals = disposals.len(),
            "scope is closed",
        );
        let res = disposal::dispose_all(disposals);
        drop(objects);
        res
    }

    fn get_object(&self, context: &CallContext) -> Result<Box<dyn Managed>, InjectorError> {
        let key = context.key();
        if let Some(object) = self.try_get_cached_object(key)? {
            return Ok(object);
        }

        let entry = self.try_get_provider_by_key(key)?;
        match entry.kind() {
            ProviderKind::Owned(provider) => {
                self.get_unbounded_object_from_self(provider.as_ref(), context)
            }
            ProviderKind::Shared {
                provider,
                lifetime,
                disposer,
            } => match (*lifetime, self.parent.as_ref()) {
                (Lifetime::Singleton, Some(parent)) => parent.get_object(context),
                (Lifetime::Scoped, None) if self.options.validates_scopes() => {
                    Err(InjectorError::ShortLifetime {
                        key: key.dyn_clone(),
                        lifetime: Lifetime::Scoped,
                        scope: self.level,
                    })
                }
                _ => {
                    self.get_shared_object_from_self(provider.as_ref(), disposer.as_ref(), context)
                }
            },
        }
    }

    fn try_get_cached_object(
        &self,
        key: &dyn Key,
    ) -> Result<Option<Box<dyn Managed>>, InjectorError> {
        let managed = self.managed.read();
        self.ensure_open(&managed, key)?;
        let object = managed.objects.get(key).map(|entry| entry.clone_managed());
        if object.is_some() {
            tracing::trace!(%key, scope = %self.level, "cached object is reused");
        }
        Ok(object)
    }

    fn ensure_open(
        &self,
        managed: &SharedManagedObjectData,
        key: &dyn Key,
    ) -> Result<(), InjectorError> {
        match managed.state {
            ScopeState::Open => Ok(()),
            ScopeState::Closed => Err(InjectorError::ScopeClosed {
                key: key.dyn_clone(),
                scope: self.level,
            }),
        }
    }

    fn try_get_provider_by_key(
        &self,
        key: &dyn Key,
    ) -> Result<&ProviderEntry, InjectorError> {
        self.providers
            .get(key)
            .ok_or_else(|| InjectorError::NotFound {
                key: key.dyn_clone(),
            })
    }

    fn get_shared_object_from_self(
        &self,
        provider: &dyn SharedProvider,
        disposer: Option<&Disposer>,
        context: &CallContext,
    ) -> Result<Box<dyn Managed>, InjectorError> {
        let key = context.key();
        let mut managed = self.managed.write();
        self.ensure_open(&managed, key)?;

        // Another thread may have finished the construction since the cache
        // was checked without the write lock.
        if let Some(entry) = managed.objects.get(key) {
            return Ok(entry.clone_managed());
        }

        if let Some(object_context) = managed.constructing.get_mut(key) {
            if object_context.is_constructed_by_current_thread() {
                Err(self.stop_construction_on_cyclic_dependency(managed, key))
            } else {
                let receiver = object_context.register_waiter();
                drop(managed);
                Self::get_object_on_object_context_response(receiver)
            }
        } else {
            managed
                .constructing
                .insert(key.dyn_clone(), ConstructingObjectContext::new());
            drop(managed);
            self.construct_shared_object(provider, disposer, context)
        }
    }

    fn stop_construction_on_cyclic_dependency(
        &self,
        managed: RwLockWriteGuard<SharedManagedObjectData>,
        key: &dyn Key,
    ) -> InjectorError {
        let err = InjectorError::CyclicDependency {
            key: key.dyn_clone(),
        };
        self.notify_waiters(managed, key, WaitResponse::Error(err.clone()));
        err
    }

    fn get_object_on_object_context_response(
        receiver: Receiver<WaitResponse>,
    ) -> Result<Box<dyn Managed>, InjectorError> {
        match receiver.recv() {
            Ok(WaitResponse::Constructed(object)) => Ok(object.upcast_managed()),
            Ok(WaitResponse::Error(err)) => Err(err),
            Err(_) => unreachable!("the constructing thread should always respond"),
        }
    }

    fn construct_shared_object(
        &self,
        provider: &dyn SharedProvider,
        disposer: Option<&Disposer>,
        context: &CallContext,
    ) -> Result<Box<dyn Managed>, InjectorError> {
        let key = context.key();
        let guard = ConstructionGuard::new(self, key);
        let res = provider.dyn_provide_shared(self, context);
        guard.complete();
        let mut managed = self.managed.write();

        match res {
            Ok(object) if managed.state == ScopeState::Closed => {
                // The scope was closed during the construction, so nobody
                // would dispose the object later.
                let err = InjectorError::ScopeClosed {
                    key: key.dyn_clone(),
                    scope: self.level,
                };
                self.notify_waiters(managed, key, WaitResponse::Error(err.clone()));
                if let Some(disposer) = disposer {
                    let disposal = Disposal::new(key.dyn_clone(), object, disposer.clone());
                    if let Err(dispose_err) = disposal.run() {
                        tracing::warn!(
                            %key,
                            error = %dispose_err,
                            "could not dispose an object built after its scope was closed",
                        );
                    }
                }
                Err(err)
            }
            Ok(object) => {
                tracing::debug!(%key, scope = %self.level, "shared object is constructed");
                managed.objects.insert(key.dyn_clone(), object.dyn_clone());
                if let Some(disposer) = disposer {
                    managed.disposals.push(Disposal::new(
                        key.dyn_clone(),
                        object.dyn_clone(),
                        disposer.clone(),
                    ));
                }
                self.notify_waiters(managed, key, WaitResponse::Constructed(object.dyn_clone()));
                Ok(object.upcast_managed())
            }
            Err(err) => {
                tracing::debug!(
                    %key,
                    scope = %self.level,
                    error = %err,
                    "shared object construction failed",
                );
                self.notify_waiters(managed, key, WaitResponse::Error(err.clone()));
                Err(err)
            }
        }
    }

    fn notify_waiters(
        &self,
        mut managed: RwLockWriteGuard<SharedManagedObjectData>,
        key: &dyn Key,
        response: WaitResponse,
    ) {
        if let Some(object_context) = managed.constructing.remove(key) {
            drop(managed);
            object_context.notify(response);
        }
    }

    fn get_unbounded_object_from_self(
        &self,
        provider: &dyn Provider,
        context: &CallContext,
    ) -> Result<Box<dyn Managed>, InjectorError> {
        let key = context.key();
        if context.trace().previous_exist_key(key) {
            Err(InjectorError::CyclicDependency {
                key: key.dyn_clone(),
            })
        } else {
            provider.dyn_provide(self, context)
        }
    }
}

impl Injector for ContainerCore {
    fn dyn_get(&self, key: &dyn Key) -> Result<Box<dyn Managed>, InjectorError> {
        let context = CallContext::new(key);
        self.get_object(&context)
    }

    fn dyn_get_dependency<'a>(
        &self,
        key: &dyn Key,
        context: &'a CallContext<'a>,
    ) -> Result<Box<dyn Managed>, InjectorError> {
        let context = context.append(key);
        self.get_object(&context)
    }

    fn keys(&self, type_id: TypeId) -> Vec<Box<dyn Key>> {
        self.providers.keys(type_id)
    }
}

impl Drop for ContainerCore {
    fn drop(&mut self) {
        if self.managed.get_mut().state == ScopeState::Closed {
            return;
        }
        if let Err(err) = self.close() {
            tracing::warn!(
                scope = %self.level,
                error = %err,
                "could not dispose every object of a dropped scope",
            );
        }
    }
}

struct SharedManagedObjectData {
    objects: ObjectMap,
    constructing: HashMap<Box<dyn Key>, ConstructingObjectContext>,
    disposals: Vec<Disposal>,
    state: ScopeState,
}

impl SharedManagedObjectData {
    fn new() -> Self {
        Self {
            objects: ObjectMap::new(),
            constructing: HashMap::new(),
            disposals: Vec::new(),
            state: ScopeState::Open,
        }
    }
}

struct ConstructingObjectContext {
    on_thread: ThreadId,
    waiters: Vec<Sender<WaitResponse>>,
}

impl ConstructingObjectContext {
    fn new() -> Self {
        Self {
            on_thread: thread::current().id(),
            waiters: Vec::new(),
        }
    }

    fn is_constructed_by_current_thread(&self) -> bool {
        thread::current().id() == self.on_thread
    }

    fn register_waiter(&mut self) -> Receiver<WaitResponse> {
        let (sender, receiver) = oneshot::channel();
        self.waiters.push(sender);
        receiver
    }

    fn notify(self, response: WaitResponse) {
        for sender in self.waiters {
            let _ = sender.send(response.clone());
        }
    }
}

/// Withdraws a construction whose factory unwinds, so that waiters are
/// released and a later resolution runs the factory again.
struct ConstructionGuard<'a> {
    core: &'a ContainerCore,
    key: &'a dyn Key,
    completed: bool,
}

impl<'a> ConstructionGuard<'a> {
    fn new(core: &'a ContainerCore, key: &'a dyn Key) -> Self {
        Self {
            core,
            key,
            completed: false,
        }
    }

    fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for ConstructionGuard<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        tracing::warn!(key = %self.key, scope = %self.core.level, "factory panicked");
        let err = InjectorError::FactoryPanicked {
            key: self.key.dyn_clone(),
        };
        let managed = self.core.managed.write();
        self.core
            .notify_waiters(managed, self.key, WaitResponse::Error(err));
    }
}

enum WaitResponse {
    Constructed(Box<dyn SharedManaged>),
    Error(InjectorError),
}

impl Clone for WaitResponse {
    fn clone(&self) -> Self {
        match self {
            Self::Constructed(object) => Self::Constructed(object.dyn_clone()),
            Self::Error(err) => Self::Error(err.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    use crate::container::injector::TypedInjector;
    use crate::key;
    use crate::provider::{ClosureProvider, RawClosureProvider};

    use super::*;

    struct Node {
        id: u32,
        left: Option<Arc<Node>>,
        right: Option<Arc<Node>>,
    }

    impl Node {
        fn entry(id: u32, lifetime: Lifetime) -> ProviderEntry {
            let provider = RawClosureProvider::new(move |injector: &dyn Injector| {
                let node = if id <= 1 {
                    Node {
                        id,
                        left: None,
                        right: None,
                    }
                } else {
                    Node {
                        id,
                        left: Some(injector.get(key::qualified(id - 1))?),
                        right: Some(injector.get(key::qualified(id - 2))?),
                    }
                };
                Ok::<_, InjectorError>(Arc::new(node))
            });
            ProviderEntry::new_shared(
                Box::new(key::qualified::<Arc<Node>, _>(id)),
                Box::new(provider),
                lifetime,
                None,
            )
        }
    }

    #[allow(dead_code)]
    struct Cycle;

    fn root_with(entries: Vec<ProviderEntry>, options: ContainerOptions) -> Arc<ContainerCore> {
        let mut providers = ProviderMap::new();
        for entry in entries {
            assert!(providers.insert(entry).is_ok());
        }
        Arc::new(ContainerCore::new_root(providers, options))
    }

    #[test]
    fn container_core_get_succeeds_when_singleton_is_requested_from_child() {
        let root = root_with(vec![Node::entry(0, Lifetime::Singleton)], ContainerOptions::new());
        let child = ContainerCore::new_child(Arc::clone(&root), ScopeId::next());
        let key = key::qualified::<Arc<Node>, _>(0u32);

        let first = child.get(key).unwrap();
        let second = root.get(key).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(root.managed.read().objects.get(&key).is_some());
        assert!(child.managed.read().objects.get(&key).is_none());
    }

    #[test]
    fn container_core_get_succeeds_when_scoped_is_requested_from_children() {
        let root = root_with(vec![Node::entry(0, Lifetime::Scoped)], ContainerOptions::new());
        let first_child = ContainerCore::new_child(Arc::clone(&root), ScopeId::next());
        let second_child = ContainerCore::new_child(Arc::clone(&root), ScopeId::next());
        let key = key::qualified::<Arc<Node>, _>(0u32);

        let first = first_child.get(key).unwrap();
        assert!(Arc::ptr_eq(&first, &first_child.get(key).unwrap()));
        assert!(!Arc::ptr_eq(&first, &second_child.get(key).unwrap()));
        assert!(!Arc::ptr_eq(&first, &root.get(key).unwrap()));
        assert!(root.managed.read().objects.get(&key).is_some());
    }

    #[test]
    fn container_core_get_succeeds_when_many_threads_share_a_graph() {
        const NUM: u32 = 64;
        let entries = (0..NUM).map(|id| Node::entry(id, Lifetime::Singleton)).collect();
        let root = root_with(entries, ContainerOptions::new());

        let handles: Vec<_> = (0..NUM)
            .rev()
            .map(|id| {
                let root = Arc::clone(&root);
                thread::spawn(move || {
                    let node: Arc<Node> = root.get(key::qualified(id)).unwrap();
                    assert_eq!(node.id, id);
                    assert!(node.left.as_ref().is_none_or(|left| left.id == id - 1));
                    assert!(node.right.as_ref().is_none_or(|right| right.id == id - 2));
                })
            })
            .collect();
        handles
            .into_iter()
            .for_each(|handle| handle.join().expect("no thread should panic"));

        let top: Arc<Node> = root.get(key::qualified(NUM - 1)).unwrap();
        let below: Arc<Node> = root.get(key::qualified(NUM - 2)).unwrap();
        assert!(Arc::ptr_eq(top.left.as_ref().unwrap(), &below));
    }

    #[test]
    fn container_core_get_succeeds_when_threads_race_on_first_resolution() {
        const THREADS: usize = 8;
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));
        let provider = ClosureProvider::new({
            let calls = Arc::clone(&calls);
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                thread::yield_now();
                Ok::<_, Infallible>(Arc::new(String::from("pool")))
            }
        });
        let root = root_with(
            vec![ProviderEntry::new_shared(
                Box::new(key::of::<Arc<String>>()),
                Box::new(provider),
                Lifetime::Singleton,
                None,
            )],
            ContainerOptions::new(),
        );

        let objects: Vec<Arc<String>> = (0..THREADS)
            .map(|_| {
                let root = Arc::clone(&root);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    root.get(key::of::<Arc<String>>()).unwrap()
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().expect("no thread should panic"))
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(objects.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    fn flaky_root(calls: &Arc<AtomicUsize>, barrier: Option<Arc<Barrier>>) -> Arc<ContainerCore> {
        let provider = ClosureProvider::new({
            let calls = Arc::clone(calls);
            move || {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    if let Some(barrier) = &barrier {
                        barrier.wait();
                        barrier.wait();
                    }
                    panic!("the first connection attempt crashes");
                }
                Ok::<_, Infallible>(Arc::new(String::from("connection")))
            }
        });
        root_with(
            vec![ProviderEntry::new_shared(
                Box::new(key::of::<Arc<String>>()),
                Box::new(provider),
                Lifetime::Singleton,
                None,
            )],
            ContainerOptions::new(),
        )
    }

    #[test]
    fn container_core_get_succeeds_when_factory_panicked_before() {
        let calls = Arc::new(AtomicUsize::new(0));
        let root = flaky_root(&calls, None);
        let key = key::of::<Arc<String>>();

        let res = panic::catch_unwind(AssertUnwindSafe(|| root.get(key)));
        assert!(res.is_err());
        assert!(root.managed.read().constructing.is_empty());

        let connection = root.get(key).unwrap();
        assert_eq!(connection.as_str(), "connection");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn container_core_get_fails_when_awaited_factory_panics() {
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(2));
        let root = flaky_root(&calls, Some(Arc::clone(&barrier)));
        let key = key::of::<Arc<String>>();

        let constructing = thread::spawn({
            let root = Arc::clone(&root);
            move || panic::catch_unwind(AssertUnwindSafe(|| root.get(key))).is_err()
        });
        barrier.wait();

        let waiting = thread::spawn({
            let root = Arc::clone(&root);
            move || root.get(key)
        });
        while root
            .managed
            .read()
            .constructing
            .get(&key as &dyn Key)
            .map_or(0, |context| context.waiters.len())
            == 0
        {
            thread::yield_now();
        }
        barrier.wait();

        assert!(constructing.join().unwrap());
        assert!(matches!(
            waiting.join().unwrap(),
            Err(InjectorError::FactoryPanicked { .. })
        ));
        assert!(root.get(key).is_ok());
    }

    #[test]
    fn container_core_get_fails_when_there_exists_cyclic_dependency() {
        let shared = RawClosureProvider::new(|injector: &dyn Injector| {
            let cycle: Arc<Cycle> = injector.get(key::named("transient"))?;
            Ok::<_, InjectorError>(cycle)
        });
        let transient = RawClosureProvider::new(|injector: &dyn Injector| {
            let cycle: Arc<Cycle> = injector.get(key::named("singleton"))?;
            Ok::<_, InjectorError>(cycle)
        });
        let root = root_with(
            vec![
                ProviderEntry::new_shared(
                    Box::new(key::named::<Arc<Cycle>>("singleton")),
                    Box::new(shared),
                    Lifetime::Singleton,
                    None,
                ),
                ProviderEntry::new_owned(
                    Box::new(key::named::<Arc<Cycle>>("transient")),
                    Box::new(transient),
                ),
            ],
            ContainerOptions::new(),
        );

        assert!(matches!(
            root.get(key::named::<Arc<Cycle>>("singleton")),
            Err(InjectorError::CyclicDependency { .. })
        ));
        assert!(matches!(
            root.get(key::named::<Arc<Cycle>>("transient")),
            Err(InjectorError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn container_core_get_fails_when_scoped_is_requested_from_root_with_validation() {
        let root = root_with(
            vec![Node::entry(0, Lifetime::Scoped)],
            ContainerOptions::new().validate_scopes(true),
        );
        let child = ContainerCore::new_child(Arc::clone(&root), ScopeId::next());
        let key = key::qualified::<Arc<Node>, _>(0u32);

        assert!(matches!(
            root.get(key),
            Err(InjectorError::ShortLifetime {
                lifetime: Lifetime::Scoped,
                scope: ScopeLevel::Root,
                ..
            })
        ));
        assert!(child.get(key).is_ok());
    }

    #[test]
    fn container_core_get_fails_when_closed() {
        let root = root_with(vec![Node::entry(0, Lifetime::Scoped)], ContainerOptions::new());
        let child = ContainerCore::new_child(Arc::clone(&root), ScopeId::next());
        let key = key::qualified::<Arc<Node>, _>(0u32);

        assert!(child.get(key).is_ok());
        child.close().unwrap();
        assert_eq!(child.state(), ScopeState::Closed);
        assert!(matches!(
            child.get(key),
            Err(InjectorError::ScopeClosed { .. })
        ));
        assert!(matches!(
            child.close(),
            Err(DisposeError::AlreadyClosed { .. })
        ));
        assert!(root.get(key).is_ok());
    }

    #[test]
    fn container_core_get_fails_when_key_not_found() {
        let root = root_with(Vec::new(), ContainerOptions::new());
        assert!(matches!(
            root.get(key::of::<i32>()),
            Err(InjectorError::NotFound { .. })
        ));
    }
}
