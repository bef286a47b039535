use phasebus_phase::DEFAULT_PHASE;
use pretty_assertions::assert_eq;

use super::*;

fn bus() -> EventBus<&'static str> {
	EventBus::new(Identifier::parse("test:bus").unwrap())
}

fn summing_u32() -> Arc<Event<u32, &'static str>> {
	Arc::new(Event::create(|cbs: &[u32]| cbs.iter().sum()))
}

fn summing_u64() -> Arc<Event<u64, &'static str>> {
	Arc::new(Event::create(|cbs: &[u64]| cbs.iter().sum()))
}

#[test]
fn test_add_and_lookup() {
	let bus = bus();
	assert!(bus.is_empty());

	let event = summing_u32();
	bus.add(event.clone());

	assert_eq!(bus.len(), 1);
	assert!(bus.contains(event.key()));
	let found = bus.event::<u32>(event.key()).unwrap();
	assert!(Arc::ptr_eq(&found, &event));
}

#[test]
fn test_add_event_replaces_existing() {
	let bus = bus();
	let key = EventKey::of::<u32>("shared");
	let first = summing_u32();
	let second = summing_u32();
	first.register_keyed("old", 1);

	bus.add_event(key.clone(), first);
	bus.add_event(key.clone(), second.clone());

	assert_eq!(bus.len(), 1);
	assert!(Arc::ptr_eq(&bus.event::<u32>(&key).unwrap(), &second));
	assert_eq!(bus.invoker::<u32>(&key).unwrap(), 0);
}

#[test]
fn test_register_listener_by_key() {
	let bus = bus();
	let event = summing_u32();
	bus.add(event.clone());

	let late = Identifier::parse("test:late").unwrap();
	assert!(bus.register_listener(event.key(), &late, "a", 3u32).unwrap());
	assert!(!bus.register_listener(event.key(), &DEFAULT_PHASE, "a", 4u32).unwrap());

	assert_eq!(event.phase_of(&"a"), Some(late));
	assert_eq!(bus.invoker::<u32>(event.key()).unwrap(), 3);
}

#[test]
fn test_register_listener_unknown_event() {
	let bus = bus();
	let key = EventKey::of_default::<u32>();
	let err = bus
		.register_listener(&key, &DEFAULT_PHASE, "a", 1u32)
		.unwrap_err();
	assert_eq!(err, EventError::UnknownEvent { key });
}

#[test]
fn test_register_listener_wrong_callback_type() {
	let bus = bus();
	let event = summing_u32();
	bus.add(event.clone());

	let err = bus
		.register_listener(event.key(), &DEFAULT_PHASE, "a", 1u64)
		.unwrap_err();
	assert_eq!(err.as_label(), "event_type_mismatch");
	assert!(event.is_empty());
}

#[test]
fn test_unregister_all_spans_events() {
	let bus = bus();
	let small = summing_u32();
	let wide = summing_u64();
	bus.add(small.clone());
	bus.add(wide.clone());

	small.register_keyed("shared", 1);
	small.register_keyed("other", 2);
	wide.register_keyed("shared", 10);

	assert!(bus.is_registered_anywhere(&"shared"));
	assert_eq!(bus.unregister_all(&"shared"), 2);
	assert!(!bus.is_registered_anywhere(&"shared"));

	assert_eq!(small.invoker(), 2);
	assert_eq!(wide.invoker(), 0);
	assert_eq!(bus.unregister_all(&"shared"), 0);
}

#[test]
fn test_try_invoker() {
	let bus = bus();
	let event = summing_u64();
	bus.add(event.clone());
	event.register_keyed("a", 7);

	assert_eq!(bus.try_invoker::<u64>(event.key()), Some(7));
	assert_eq!(bus.try_invoker::<u32>(event.key()), None);
	assert_eq!(bus.try_invoker::<u64>(&EventKey::of::<u64>("missing")), None);
}

#[test]
fn test_same_type_distinct_qualifiers() {
	let bus = bus();
	let open = Arc::new(
		Event::<u32, &'static str>::builder(|cbs: &[u32]| cbs.iter().sum())
			.qualifier("open")
			.build()
			.unwrap(),
	);
	let close = Arc::new(
		Event::<u32, &'static str>::builder(|cbs: &[u32]| cbs.iter().sum())
			.qualifier("close")
			.build()
			.unwrap(),
	);
	bus.add(open.clone());
	bus.add(close.clone());
	open.register_keyed("a", 1);

	assert_eq!(bus.len(), 2);
	assert_eq!(bus.invoker::<u32>(&EventKey::of::<u32>("open")).unwrap(), 1);
	assert_eq!(bus.invoker::<u32>(&EventKey::of::<u32>("close")).unwrap(), 0);
}
