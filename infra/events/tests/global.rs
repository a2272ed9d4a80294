pub mod fixtures;

use fixtures::*;
use herald::{EventBus, EventBusError, Payload};
use serial_test::serial;
use std::sync::Arc;

#[test]
#[serial]
fn test_global_listen_and_dispatch() {
    let log = Log::default();
    let sink = log.clone();
    herald::listen("global.data.test", move |data: &String| sink.push(data.as_str())).unwrap();

    herald::dispatch("global.data.test", "index data".to_owned()).unwrap();

    assert_eq!(log.entries(), ["index data"]);
    assert!(herald::global().has_listeners("global.data.test"));
}

#[test]
#[serial]
fn test_global_wildcard_and_typed_dispatch() {
    let log = Log::default();
    for key in ["global.many.test1", "global.many.test2"] {
        let sink = log.clone();
        herald::listen(key, move |_: &Payload, name: &str| sink.push(name)).unwrap();
    }
    let sink = log.clone();
    herald::listen_type(move |data: &TestEventStructData| sink.push(data.data.as_str())).unwrap();

    assert_eq!(herald::dispatch("global.many.*", ()).unwrap(), 2);
    herald::dispatch_value(TestEventStructData { data: "typed".to_owned() }).unwrap();

    assert_eq!(log.entries(), ["global.many.test1", "global.many.test2", "typed"]);
}

#[test]
#[serial]
fn test_global_subscribe() {
    let prefixed = Arc::new(TestEventPrefix::default());
    herald::subscribe_shared(Arc::clone(&prefixed)).unwrap();
    let err = herald::listen_any("global.raw", Box::new(Arc::clone(&prefixed))).unwrap_err();
    assert!(matches!(err, EventBusError::InvalidListener { .. }));

    herald::dispatch("ABCTestEvent", "global".to_owned()).unwrap();

    assert_eq!(prefixed.log.entries(), ["OnTestEvent:global"]);
    assert!(matches!(herald::subscribe(Inert), Err(EventBusError::NotSubscriber { .. })));
}

#[test]
#[serial]
fn test_new_events_share_nothing_with_the_global_bus() {
    let local: EventBus = herald::new_events();
    let log = Log::default();
    let sink = log.clone();
    local.listen("global.isolated", move |_: &Payload| sink.push("local")).unwrap();

    assert_eq!(herald::dispatch("global.isolated", ()).unwrap(), 0);
    assert_eq!(local.dispatch("global.isolated", ()).unwrap(), 1);
    assert_eq!(log.entries(), ["local"]);
}
