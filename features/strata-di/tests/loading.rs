use std::sync::{Arc, Mutex};

use futures::executor::block_on;
use strata_di::{
    Component, Container, ContainerError, ContainerState, Dependent, DynError, InjectionContext,
    LoadError, Loader, Module, ModuleError, Provider, ProviderFactory, RequireError,
};

type Log = Arc<Mutex<Vec<String>>>;

pub trait Observer: Send + Sync {
    fn notify(&self, event: &str);
}
pub trait Factory: Send + Sync {
    fn create(&self, variant: &str) -> Result<String, DynError>;
}

struct Recording(Log);
impl Observer for Recording {
    fn notify(&self, event: &str) {
        self.0.lock().unwrap().push(format!("event {event}"));
    }
}

struct Creating(Arc<dyn Observer>);
impl Factory for Creating {
    fn create(&self, variant: &str) -> Result<String, DynError> {
        match variant {
            "A" | "B" => {
                self.0.notify(&format!("created {variant}"));
                Ok(format!("Hardware{variant}"))
            }
            other => Err(format!("unknown variant '{other}'").into()),
        }
    }
}

struct HardwareA;
struct HardwareB;

struct ObserverPublisher(Log);
impl ProviderFactory for ObserverPublisher {
    type Component = dyn Observer;

    async fn construct(&self, _ctx: InjectionContext) -> Result<Arc<dyn Observer>, DynError> {
        self.0.lock().unwrap().push("construct ObserverPublisher".into());
        Ok(Arc::new(Recording(self.0.clone())))
    }

    async fn release(&self, _instance: Arc<dyn Observer>) -> Result<(), DynError> {
        self.0.lock().unwrap().push("release ObserverPublisher".into());
        Ok(())
    }
}

struct FactoryCreator(Log);
impl ProviderFactory for FactoryCreator {
    type Component = dyn Factory;

    async fn construct(&self, ctx: InjectionContext) -> Result<Arc<dyn Factory>, DynError> {
        let observer = ctx.resolve::<Arc<dyn Observer>>().await?;
        self.0.lock().unwrap().push("construct FactoryCreator".into());
        Ok(Arc::new(Creating(observer)))
    }

    async fn release(&self, _instance: Arc<dyn Factory>) -> Result<(), DynError> {
        self.0.lock().unwrap().push("release FactoryCreator".into());
        Ok(())
    }
}

fn observer_provider(log: &Log) -> Provider {
    Provider::builder(ObserverPublisher(log.clone())).build()
}

fn factory_provider(log: &Log) -> Provider {
    Provider::builder(FactoryCreator(log.clone()))
        .import(Component::of::<dyn Observer>())
        .dependent(Dependent::of::<HardwareA>().import(Component::of::<dyn Observer>()))
        .dependent(Dependent::of::<HardwareB>().import(Component::of::<dyn Observer>()))
        .build()
}

struct ObserverModule(Log);
impl Module for ObserverModule {
    fn declare_components(&self) -> Vec<Component> {
        vec![Component::named::<dyn Observer>("HardwareObserver")]
    }

    fn declare_providers(&self) -> Vec<Provider> {
        vec![observer_provider(&self.0)]
    }

    fn init_bootstrap(&self, _container: &Container) -> Result<(), DynError> {
        self.0.lock().unwrap().push("bootstrap ObserverModule".into());
        Ok(())
    }
}

struct HardwareModule {
    log: Log,
    fail_bootstrap: bool,
}
impl Module for HardwareModule {
    fn imports(&self) -> Vec<Box<dyn Module>> {
        vec![Box::new(ObserverModule(self.log.clone()))]
    }

    fn declare_components(&self) -> Vec<Component> {
        vec![Component::named::<dyn Factory>("HardwareFactory")]
    }

    fn declare_providers(&self) -> Vec<Provider> {
        vec![factory_provider(&self.log)]
    }

    fn init_bootstrap(&self, container: &Container) -> Result<(), DynError> {
        self.log.lock().unwrap().push("bootstrap HardwareModule".into());
        let factory = container.require::<dyn Factory>()?;
        factory.create("A")?;
        if self.fail_bootstrap {
            factory.create("C")?;
        }
        Ok(())
    }
}

fn log() -> Log {
    Log::default()
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
fn loads_layers_and_bootstraps_imports_first() {
    let log = log();
    let app = block_on(Loader::new().load(HardwareModule {
        log: log.clone(),
        fail_bootstrap: false,
    }))
    .unwrap();

    assert_eq!(app.module_names(), vec!["ObserverModule", "HardwareModule"]);
    assert_eq!(app.state(), ContainerState::Bootstrapped);
    assert_eq!(
        app.container().initialized_providers(),
        vec!["ObserverPublisher", "FactoryCreator"]
    );
    assert_eq!(
        entries(&log),
        vec![
            "construct ObserverPublisher",
            "construct FactoryCreator",
            "bootstrap ObserverModule",
            "bootstrap HardwareModule",
            "event created A",
        ]
    );

    let factory = app.require::<dyn Factory>().unwrap();
    assert_eq!(factory.create("B").unwrap(), "HardwareB");
    // Unknown variants only fail the request
    assert!(factory.create("Z").is_err());
    assert!(block_on(app.resolve::<Arc<dyn Observer>>()).is_ok());

    block_on(app.shutdown()).unwrap();
    let log = entries(&log);
    assert_eq!(
        &log[log.len() - 2..],
        &["release FactoryCreator", "release ObserverPublisher"]
    );
}

#[test]
fn failing_bootstrap_tears_everything_down() {
    let log = log();
    let error = block_on(Loader::new().load(HardwareModule {
        log: log.clone(),
        fail_bootstrap: true,
    }))
    .unwrap_err();

    match error {
        LoadError::Bootstrap { module, error } => {
            assert_eq!(module, "HardwareModule");
            assert_eq!(error.to_string(), "unknown variant 'C'");
        }
        other => panic!("unexpected error: {other}"),
    }

    let log = entries(&log);
    assert_eq!(
        &log[log.len() - 2..],
        &["release FactoryCreator", "release ObserverPublisher"]
    );
}

trait Alpha: Send + Sync {}
trait Beta: Send + Sync {}
struct Nothing;
impl Alpha for Nothing {}
impl Beta for Nothing {}

struct AlphaProvider;
impl ProviderFactory for AlphaProvider {
    type Component = dyn Alpha;

    async fn construct(&self, _ctx: InjectionContext) -> Result<Arc<dyn Alpha>, DynError> {
        Ok(Arc::new(Nothing))
    }
}

struct BetaProvider;
impl ProviderFactory for BetaProvider {
    type Component = dyn Beta;

    async fn construct(&self, _ctx: InjectionContext) -> Result<Arc<dyn Beta>, DynError> {
        Ok(Arc::new(Nothing))
    }
}

struct CircularModule;
impl Module for CircularModule {
    fn declare_components(&self) -> Vec<Component> {
        vec![Component::of::<dyn Alpha>(), Component::of::<dyn Beta>()]
    }

    fn declare_providers(&self) -> Vec<Provider> {
        vec![
            Provider::builder(AlphaProvider)
                .name("A")
                .import(Component::of::<dyn Beta>())
                .build(),
            Provider::builder(BetaProvider)
                .name("B")
                .import(Component::of::<dyn Alpha>())
                .build(),
        ]
    }
}

#[test]
fn circular_imports_fail_before_anything_is_constructed() {
    let error = block_on(Loader::new().load(CircularModule)).unwrap_err();

    let LoadError::Resolve(unsatisfiable) = error else {
        panic!("expected an unsatisfiable dependency error");
    };
    assert_eq!(unsatisfiable.provider_names(), vec!["A", "B"]);
    assert!(unsatisfiable.to_string().contains("- 'A'"));
}

struct DuplicateDeclaration(Log);
impl Module for DuplicateDeclaration {
    fn imports(&self) -> Vec<Box<dyn Module>> {
        vec![Box::new(ObserverModule(self.0.clone()))]
    }

    fn declare_components(&self) -> Vec<Component> {
        vec![Component::of::<dyn Observer>()]
    }

    fn declare_providers(&self) -> Vec<Provider> {
        Vec::new()
    }
}

#[test]
fn conflicting_declarations_are_reported() {
    let error = block_on(Loader::new().load(DuplicateDeclaration(log()))).unwrap_err();
    assert!(matches!(error, LoadError::Module(ModuleError::Declaration(_))));
}

struct StrictModule(Log);
impl Module for StrictModule {
    fn declare_components(&self) -> Vec<Component> {
        vec![Component::of::<dyn Factory>(), Component::of::<dyn Observer>()]
    }

    fn declare_providers(&self) -> Vec<Provider> {
        vec![
            observer_provider(&self.0),
            Provider::builder(FactoryCreator(self.0.clone()))
                .import(Component::of::<dyn Observer>())
                .dependent(Dependent::of::<HardwareA>().import(Component::of::<dyn Alpha>()))
                .build(),
        ]
    }
}

#[test]
fn strict_dependents_reject_unsatisfiable_products() {
    let log = log();
    let lenient = block_on(Loader::new().load(StrictModule(log.clone())));
    assert!(lenient.is_ok());

    let strict = block_on(
        Loader::new()
            .strict_dependents(true)
            .concurrent_layers(false)
            .load(StrictModule(log)),
    );
    assert!(matches!(
        strict,
        Err(LoadError::Container(ContainerError::UnresolvedDependents(_)))
    ));
}

#[test]
fn manual_lifecycle_matches_the_loader() {
    let log = log();
    let mut container = Container::new();
    for layer in strata_di::resolve_layers(vec![factory_provider(&log), observer_provider(&log)])
        .unwrap()
    {
        container.bind_layer(layer).unwrap();
    }

    assert!(matches!(
        container.require::<dyn Factory>(),
        Err(RequireError::NotInitialized("FactoryCreator"))
    ));

    container.check_dependencies().unwrap();
    block_on(container.init_resources()).unwrap();
    assert_eq!(container.state(), ContainerState::ResourcesReady);

    block_on(container.teardown()).unwrap();
    assert_eq!(container.state(), ContainerState::TornDown);
}
