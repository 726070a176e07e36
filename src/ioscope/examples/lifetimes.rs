use std::convert::Infallible;
use std::error::Error;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use ioscope::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Shows how transient, scoped and singleton objects are reused")]
struct Args {
    /// Which demo to run.
    #[arg(long, value_enum, default_value_t = Demo::All)]
    demo: Demo,

    /// Reject scoped objects resolved outside of a scope.
    #[arg(long)]
    validate_scopes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Demo {
    #[value(name = "1")]
    Basic,
    #[value(name = "2")]
    Root,
    #[value(name = "3")]
    Scopes,
    All,
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let options = ContainerOptions::new().validate_scopes(args.validate_scopes);

    if matches!(args.demo, Demo::Basic | Demo::All) {
        basic(options.clone())?;
    }
    if matches!(args.demo, Demo::Root | Demo::All) {
        root(options.clone())?;
    }
    if matches!(args.demo, Demo::Scopes | Demo::All) {
        scopes(options)?;
    }
    Ok(())
}

fn basic(options: ContainerOptions) -> Result<(), Box<dyn Error + Send + Sync>> {
    let container = Container::init_with_options(BasicModule, options)?;
    let service: Arc<MyService> = container.get(key::of())?;
    service.do_it();
    Ok(())
}

fn root(options: ContainerOptions) -> Result<(), Box<dyn Error + Send + Sync>> {
    let container = Container::init_with_options(OperationModule, options)?;

    for request in ["1st", "2nd"] {
        banner(request);
        container.get(key::of::<Arc<TransientOperation>>())?;
        match container.get(key::of::<Arc<ScopedOperation>>()) {
            Ok(_) => {}
            Err(err @ InjectorError::ShortLifetime { .. }) => println!("{err}"),
            Err(err) => return Err(err.into()),
        }
        container.get(key::of::<Arc<SingletonOperation>>())?;
    }
    footer();

    container.dispose()?;
    Ok(())
}

fn scopes(options: ContainerOptions) -> Result<(), Box<dyn Error + Send + Sync>> {
    let container = Container::init_with_options(OperationModule, options)?;

    for request in ["1st", "2nd"] {
        banner(request);
        let scope = container.create_scope();
        scope.get(key::of::<Arc<TransientOperation>>())?;
        scope.get(key::of::<Arc<ScopedOperation>>())?;
        scope.get(key::of::<Arc<SingletonOperation>>())?;
        scope.close()?;
    }
    footer();

    container.dispose()?;
    Ok(())
}

fn banner(request: &str) {
    println!();
    println!("-------- {request} Request --------");
    println!();
}

fn footer() {
    println!();
    println!("-----------------------------");
    println!();
}

struct MyService;

impl MyService {
    fn do_it(&self) {
        println!("Hello MS DI!");
    }
}

struct TransientOperation;

struct ScopedOperation;

struct SingletonOperation;

fn created<T>(kind: &str, object: T) -> Result<Arc<T>, Infallible> {
    println!("{kind} service is created!");
    Ok(Arc::new(object))
}

struct BasicModule;

impl Module for BasicModule {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        bind::<Arc<MyService>>()
            .to_closure(|| Ok::<_, Infallible>(Arc::new(MyService)))
            .set_on(configurer);
        Ok(())
    }
}

struct OperationModule;

impl Module for OperationModule {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        bind::<Arc<TransientOperation>>()
            .to_closure(|| created("Transient", TransientOperation))
            .set_on(configurer);

        bind::<Arc<ScopedOperation>>()
            .as_scoped()
            .to_closure(|| created("Scoped", ScopedOperation))
            .set_on(configurer);

        bind::<Arc<SingletonOperation>>()
            .as_singleton()
            .to_closure(|| created("Singleton", SingletonOperation))
            .set_on(configurer);

        Ok(())
    }
}
