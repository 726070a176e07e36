use std::collections::BTreeMap;
use std::convert::Infallible;
use std::error::Error;
use std::sync::Arc;

use ioscope::key::KeyTypePattern;
use ioscope::prelude::*;

trait Greeter: Send + Sync {
    fn greet(&self, name: &str) -> String;
}

struct English {
    punctuation: &'static str,
}

impl Greeter for English {
    fn greet(&self, name: &str) -> String {
        format!("Hello, {name}{}", self.punctuation)
    }
}

impl Component for English {
    type Output = Arc<dyn Greeter>;

    type Error = InjectorError;

    fn construct<I>(injector: &I) -> Result<Self, Self::Error>
    where
        I: TypedInjector + ?Sized,
    {
        Ok(Self {
            punctuation: injector.get(key::named("punctuation"))?,
        })
    }

    fn finish(self) -> Self::Output {
        Arc::new(self)
    }
}

struct Connection;

impl Dispose for Connection {
    fn dispose(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

struct GreeterModule;

impl Module for GreeterModule {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        bind::<&'static str>()
            .named("punctuation")
            .to_instance("!")
            .set_on(configurer);

        bind::<Arc<dyn Greeter>>()
            .qualified_by('e')
            .as_singleton()
            .to_component::<English>()
            .set_on(configurer);

        bind::<Arc<Connection>>()
            .as_scoped()
            .to_closure(|| Ok::<_, Infallible>(Arc::new(Connection)))
            .disposable()
            .set_on(configurer);

        bind_key(key::named::<String>("welcome"))
            .to_raw_closure(|injector: &dyn Injector| {
                let greeter: Arc<dyn Greeter> = injector.get(key::qualified('e'))?;
                Ok::<_, InjectorError>(greeter.greet("world"))
            })
            .set_on(configurer);

        Ok(())
    }
}

struct EmptyModule;

impl Module for EmptyModule {
    fn configure(
        &self,
        _configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

fn main() {
    let configuration = Configuration::new().with(GreeterModule).with(EmptyModule);
    let container = Container::init(configuration).unwrap();

    let greeters: BTreeMap<char, Arc<dyn Greeter>> =
        container.collect(KeyTypePattern::new()).unwrap();
    assert_eq!(greeters[&'e'].greet("ioscope"), "Hello, ioscope!");

    let scope = container.create_scope();
    let _: Arc<Connection> = scope.get(key::of()).unwrap();
    let welcome: String = scope.get(key::named("welcome")).unwrap();
    assert_eq!(welcome, "Hello, world!");
    scope.close().unwrap();
    container.dispose().unwrap();
}
