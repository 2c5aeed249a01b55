use tether_core::prelude::*;
use tether_devtools::Inspector;

const COUNT: &str = r#"{ "description": "Clicks", "initial_value": 0 }"#;

const SOURCES: [(&str, &str); 2] = [
    ("label", r#"{ "mode": "from_cell", "cell": "count", "notify_current_value": true }"#),
    ("audio", r#"{ "mode": "direct_channel", "channel": "clicked" }"#),
];

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let scope = Scope::new();
    let count = ReactiveCell::from_config(CellConfig::<i32>::from_json(COUNT)?);
    scope.adopt(count.clone());
    let clicked = Channel::<i32>::new();

    let mut registry = Registry::default();
    registry.insert_cell("count", &count);
    registry.insert_channel("clicked", &clicked);

    scope.activate(RuntimeMode::Live);

    count.on_change_with_history(|c: &Change<i32>| {
        log::info!("count {} -> {}", c.previous, c.current);
    });

    let mut inspector = Inspector::new();
    inspector.enabled = true;
    inspector.watch("count", count.clone());

    for (name, json) in SOURCES {
        let config = EventSourceConfig::from_json(json)?;
        let source = EventSource::<i32>::from_config(&config, &registry)?;
        let sub = source.subscribe(Listener::new(move |v: &i32| {
            println!("{name}: {v}");
        }))?;
        scope.add_dispose(sub.into_dispose());
        inspector.watch(name, source);
    }

    for _ in 0..3 {
        count.update(|c| *c += 1)?;
        clicked.invoke(&count.get_value())?;
        if let Some(line) = inspector.overlay() {
            println!("{line}");
        }
    }

    scope.dispose();
    clicked.invoke(&-1)?;
    Ok(())
}
