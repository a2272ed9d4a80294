#![allow(dead_code)]

use herald::{EventBus, Handle, subscriber};
use parking_lot::Mutex;
use std::sync::Arc;

/// Ordered record of what listeners observed.
#[derive(Debug, Default, Clone)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// Handler methods using the `On<Name>` convention.
#[derive(Debug, Default)]
pub struct TestEvent {
    pub label: &'static str,
    pub log: Log,
}

#[subscriber]
impl TestEvent {
    #[allow(non_snake_case)]
    pub fn OnTestEvent(&self, data: &String) {
        self.log.push(format!("{}OnTestEvent:{data}", self.label));
    }

    #[allow(non_snake_case)]
    pub fn OnTestEventName(&self, data: &String, name: &str) {
        self.log.push(format!("{}OnTestEventName:{data}:{name}", self.label));
    }
}

/// Prefixes every discovered event with `ABC`.
#[derive(Debug, Default)]
pub struct TestEventPrefix {
    pub log: Log,
}

#[subscriber]
impl TestEventPrefix {
    pub fn event_prefix(&self) -> &'static str {
        "ABC"
    }

    #[allow(non_snake_case)]
    pub fn OnTestEvent(&self, data: &String) {
        self.log.push(format!("OnTestEvent:{data}"));
    }
}

/// Registers itself by hand; its `on_*` method must not be discovered.
#[derive(Debug, Default)]
pub struct TestEventSubscribe {
    pub log: Log,
}

#[subscriber]
impl TestEventSubscribe {
    pub fn subscribe(self: &Arc<Self>, bus: &EventBus) -> herald::Result<()> {
        let this = Arc::clone(self);
        bus.listen("TestEventSubscribe", move |data: &String| this.on_test_event(data))
    }

    pub fn on_test_event(&self, data: &String) {
        self.log.push(format!("on_test_event:{data}"));
    }
}

/// Payload for type-keyed dispatch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TestEventStructData {
    pub data: String,
}

/// Object handler receiving string payloads.
#[derive(Debug, Default)]
pub struct TestEventStructHandle {
    pub log: Log,
}

impl Handle for TestEventStructHandle {
    type Event = String;

    fn handle(&self, event: &String) {
        self.log.push(format!("handle:{event}"));
    }
}

/// Snake-case handlers, explicit names and fallible methods.
#[derive(Debug, Default)]
pub struct Orders {
    pub log: Log,
}

#[subscriber]
impl Orders {
    pub fn on_order_placed(&self, order: &TestEventStructData) -> Result<(), std::io::Error> {
        if order.data.is_empty() {
            return Err(std::io::Error::other("order without data"));
        }
        self.log.push(format!("placed:{}", order.data));
        Ok(())
    }

    #[event("orders.cancelled")]
    pub fn cancelled(&self, data: &String, name: &str) {
        self.log.push(format!("{name}:{data}"));
    }

    pub fn pending(&self) -> usize {
        self.log.entries().len()
    }
}

/// Exposes nothing the subscriber scan can pick up.
#[derive(Debug, Default)]
pub struct Inert;

#[subscriber]
impl Inert {
    pub fn describe(&self) -> &'static str {
        "inert"
    }
}

/// Names a handler but takes its payload by value, so nothing is registered.
#[derive(Debug, Default)]
pub struct Mismatched;

#[subscriber]
impl Mismatched {
    #[allow(non_snake_case)]
    pub fn OnTestEvent(&self, _data: String) {}
}

/// `PascalCase` spelling of the prefix hook.
#[derive(Debug, Default)]
pub struct TestEventPascalPrefix {
    pub log: Log,
}

#[subscriber]
impl TestEventPascalPrefix {
    #[allow(non_snake_case)]
    pub fn EventPrefix(&self) -> &'static str {
        "ABC"
    }

    #[allow(non_snake_case)]
    pub fn OnTestEvent(&self, data: &String) {
        self.log.push(format!("OnTestEvent:{data}"));
    }
}

/// `PascalCase` spelling of the manual hook.
#[derive(Debug, Default)]
pub struct TestEventPascalSubscribe {
    pub log: Log,
}

#[subscriber]
impl TestEventPascalSubscribe {
    #[allow(non_snake_case)]
    pub fn Subscribe(&self, bus: &EventBus) -> herald::Result<()> {
        let log = self.log.clone();
        bus.listen("TestEventSubscribe", move |data: &String| log.push(format!("Subscribe:{data}")))
    }

    #[allow(non_snake_case)]
    pub fn OnTestEvent(&self, data: &String) {
        self.log.push(format!("OnTestEvent:{data}"));
    }
}
