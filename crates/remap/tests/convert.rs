// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end conversion scenarios: explicit mappings, structural
//! auto-mappings, enum/sequence/map coercion and the overwrite protocol.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use remap::{
    AutoMapping, ConvertError, ConverterSet, Engine, Mapping, PropertySource, Remap, Value,
};

#[derive(Remap, Default, Clone)]
struct FromObject {
    wrapped_value: Option<String>,
    name: String,
    #[remap(rename = "test_value")]
    enum_value: Option<String>,
    age: u32,
    numbers: Vec<i32>,
    table: HashMap<i32, String>,
}

#[derive(Remap, Default, Clone)]
struct ToObject {
    wrapped_value: Option<WrappedValue>,
    name: String,
    #[remap(rename = "enum_value")]
    test_value: Option<TestEnum>,
    age: u32,
    numbers: Vec<i32>,
    table: HashMap<i32, String>,
}

#[derive(Remap, Default, Clone)]
struct WrappedValue {
    value: String,
    other_value: String,
}

#[derive(Remap, Clone, Copy, Debug, PartialEq, Eq)]
enum TestEnum {
    Error,
    Yes,
    No,
    Maybe,
}

#[derive(Remap, Default, Clone, Debug)]
struct FailingToObject {
    name: String,
}

fn wrap_string(engine: &Engine) {
    engine
        .add_mapping::<String, WrappedValue>(|source| WrappedValue {
            value: source,
            other_value: String::new(),
        })
        .expect("register string wrapper");
}

// ---------------------------------------------------------------------------
// Explicit mappings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn converts_primitive_type() {
    let engine = Engine::new();
    engine
        .add_mapping::<i32, bool>(|source| source > 0)
        .expect("register");

    let result = engine.convert::<bool>(1i32).await.expect("convert");
    assert_eq!(result, Some(true));
}

#[tokio::test]
async fn runs_post_processing_after_convert() {
    let engine = Engine::new();
    engine
        .add_mapping::<i32, i64>(|source| i64::from(source) + 2)
        .expect("register");

    let result = engine
        .convert_with::<i64, _>(1i32, |with_two_added| async move { with_two_added * 3 })
        .await
        .expect("convert");
    assert_eq!(result, Some(9));
}

#[tokio::test]
async fn async_mapping_may_suspend() {
    let engine = Engine::new();
    engine
        .add_mapping_async::<u32, u64, _>(|source| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            u64::from(source) * 2
        })
        .expect("register");

    let result = engine.convert::<u64>(21u32).await.expect("convert");
    assert_eq!(result, Some(42));
}

#[tokio::test]
async fn null_converts_to_null_without_invoking_converter() {
    let engine = Engine::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    engine
        .add_mapping::<String, String>(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            String::from("not null")
        })
        .expect("register");

    let result = engine.convert::<String>(Value::null()).await.expect("convert");
    assert_eq!(result, None);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fails_when_no_mapping_exists() {
    let engine = Engine::new();
    engine
        .add_mapping::<String, String>(|_| String::from("a string mapper"))
        .expect("register");

    let err = engine
        .convert::<bool>(String::from("a string value"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ConvertError::MapperNotFound {
            from: "String",
            to: "bool"
        }
    );
}

#[tokio::test]
async fn already_converted_value_passes_through() {
    let engine = Engine::new();
    let result = engine.convert::<u32>(7u32).await.expect("convert");
    assert_eq!(result, Some(7));
}

// ---------------------------------------------------------------------------
// Structural auto-mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn auto_mapping_copies_matching_fields() {
    let engine = Engine::new();
    wrap_string(&engine);
    engine
        .add_auto_mapping::<FromObject, ToObject>()
        .expect("register");

    let from = FromObject {
        name: "Testsson".into(),
        age: 22,
        ..FromObject::default()
    };

    let to = engine
        .convert::<ToObject>(from.clone())
        .await
        .expect("convert")
        .expect("present");
    assert_eq!(to.name, from.name);
    assert_eq!(to.age, from.age);
}

#[tokio::test]
async fn auto_mapping_wraps_nested_values() {
    let engine = Engine::new();
    wrap_string(&engine);
    engine
        .add_auto_mapping::<FromObject, ToObject>()
        .expect("register");

    let from = FromObject {
        name: "Testsson".into(),
        wrapped_value: Some("inner value".into()),
        age: 22,
        ..FromObject::default()
    };

    let to = engine
        .convert::<ToObject>(from)
        .await
        .expect("convert")
        .expect("present");
    assert_eq!(to.wrapped_value.expect("wrapped").value, "inner value");
}

#[tokio::test]
async fn auto_mapping_unwraps_nested_values() {
    let engine = Engine::new();
    engine
        .add_mapping::<WrappedValue, String>(|source| source.value)
        .expect("register unwrap");
    engine
        .add_auto_mapping::<ToObject, FromObject>()
        .expect("register");

    let from = ToObject {
        name: "Testsson".into(),
        wrapped_value: Some(WrappedValue {
            value: "sklep".into(),
            other_value: String::new(),
        }),
        age: 22,
        ..ToObject::default()
    };

    let to = engine
        .convert::<FromObject>(from)
        .await
        .expect("convert")
        .expect("present");
    assert_eq!(to.wrapped_value.as_deref(), Some("sklep"));
}

#[tokio::test]
async fn null_source_produces_null_from_auto_mapping() {
    let engine = Engine::new();
    wrap_string(&engine);
    engine
        .add_auto_mapping::<FromObject, ToObject>()
        .expect("register");

    let result = engine
        .convert::<ToObject>(Value::null())
        .await
        .expect("convert");
    assert!(result.is_none());
}

#[derive(Remap, Default, Clone)]
struct ExtendedFromObject {
    wrapped_value: Option<String>,
    other_wrapped_value: String,
    name: String,
    age: u32,
}

#[derive(Remap, Default, Clone)]
struct ExtendedToObject {
    wrapped_value: Option<WrappedValue>,
    name: String,
    age: u32,
}

#[tokio::test]
async fn finishing_step_runs_after_structural_copy() {
    let engine = Engine::new();
    wrap_string(&engine);
    AutoMapping::<ExtendedFromObject, ExtendedToObject>::new()
        .finish_with(|from, mut to| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if let Some(wrapped) = to.wrapped_value.as_mut() {
                wrapped.other_value = from.other_wrapped_value.clone();
            }
            to
        })
        .register(&engine)
        .expect("register");

    let from = ExtendedFromObject {
        name: "Testsson".into(),
        wrapped_value: Some("inner value".into()),
        other_wrapped_value: "second value".into(),
        age: 22,
    };

    let to = engine
        .convert::<ExtendedToObject>(from)
        .await
        .expect("convert")
        .expect("present");
    let wrapped = to.wrapped_value.expect("wrapped");
    assert_eq!(wrapped.value, "inner value");
    assert_eq!(wrapped.other_value, "second value");
}

#[tokio::test]
async fn missing_counterpart_fails_when_all_required() {
    let engine = Engine::new();
    AutoMapping::<FromObject, FailingToObject>::new()
        .driven_by(PropertySource::Source)
        .register(&engine)
        .expect("register");

    let from = FromObject {
        name: "Testsson".into(),
        age: 22,
        ..FromObject::default()
    };

    let err = engine.convert::<FailingToObject>(from).await.unwrap_err();
    assert!(matches!(err, ConvertError::PropertyMappingMissing { .. }));
}

#[tokio::test]
async fn missing_counterpart_skipped_when_not_required() {
    let engine = Engine::new();
    AutoMapping::<FromObject, FailingToObject>::new()
        .driven_by(PropertySource::Source)
        .require_all(false)
        .register(&engine)
        .expect("register");

    let from = FromObject {
        name: "Testsson".into(),
        age: 22,
        ..FromObject::default()
    };

    let to = engine
        .convert::<FailingToObject>(from)
        .await
        .expect("convert")
        .expect("present");
    assert_eq!(to.name, "Testsson");
}

// ---------------------------------------------------------------------------
// Enum coercion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn auto_mapping_parses_enum_from_text() {
    let engine = Engine::new();
    wrap_string(&engine);
    engine
        .add_auto_mapping::<FromObject, ToObject>()
        .expect("register");

    let from = FromObject {
        name: "Testsson".into(),
        enum_value: Some("Yes".into()),
        age: 22,
        ..FromObject::default()
    };

    let to = engine
        .convert::<ToObject>(from)
        .await
        .expect("convert")
        .expect("present");
    assert_eq!(to.test_value, Some(TestEnum::Yes));
}

#[tokio::test]
async fn enum_parse_is_case_insensitive() {
    let engine = Engine::new();
    let parsed = engine
        .convert::<TestEnum>(String::from("maybe"))
        .await
        .expect("convert");
    assert_eq!(parsed, Some(TestEnum::Maybe));
}

#[tokio::test]
async fn enum_round_trip_preserves_declared_case() {
    let engine = Engine::new();
    let parsed = engine
        .convert::<TestEnum>(String::from("yEs"))
        .await
        .expect("convert")
        .expect("present");
    assert_eq!(parsed, TestEnum::Yes);

    let text = engine.convert::<String>(parsed).await.expect("convert");
    assert_eq!(text.as_deref(), Some("Yes"));
}

#[tokio::test]
async fn unknown_variant_fails_with_invalid_enum_value() {
    let engine = Engine::new();
    let err = engine
        .convert::<TestEnum>(String::from("Perhaps"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ConvertError::InvalidEnumValue {
            value: "Perhaps".into(),
            target: "TestEnum"
        }
    );
}

// ---------------------------------------------------------------------------
// Sequence coercion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn auto_mapping_copies_sequences_in_order() {
    let engine = Engine::new();
    wrap_string(&engine);
    engine
        .add_auto_mapping::<FromObject, ToObject>()
        .expect("register");

    let from = FromObject {
        numbers: vec![1, 2, 3],
        ..FromObject::default()
    };

    let to = engine
        .convert::<ToObject>(from)
        .await
        .expect("convert")
        .expect("present");
    assert_eq!(to.numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn sequence_elements_convert_through_registered_mapping() {
    let engine = Engine::new();
    engine
        .add_mapping::<i32, i64>(|n| i64::from(n))
        .expect("register");

    let widened = engine
        .convert::<Vec<i64>>(vec![1i32, 2, 3])
        .await
        .expect("convert");
    assert_eq!(widened, Some(vec![1i64, 2, 3]));
}

#[tokio::test]
async fn array_and_vec_round_trip() {
    let engine = Engine::new();

    let array = engine
        .convert::<[i32; 3]>(vec![1i32, 2, 3])
        .await
        .expect("convert");
    assert_eq!(array, Some([1, 2, 3]));

    let vec = engine
        .convert::<Vec<i32>>([4i32, 5, 6])
        .await
        .expect("convert");
    assert_eq!(vec, Some(vec![4, 5, 6]));
}

#[tokio::test]
async fn array_length_mismatch_fails() {
    let engine = Engine::new();
    let err = engine.convert::<[i32; 4]>(vec![1i32, 2, 3]).await.unwrap_err();
    assert!(matches!(err, ConvertError::ListConverterMissing { .. }));
}

#[tokio::test]
async fn null_element_cannot_enter_plain_vec() {
    let engine = Engine::new();
    let err = engine
        .convert::<Vec<i32>>(vec![Some(1i32), None])
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::ListConverterMissing { .. }));
}

#[tokio::test]
async fn degenerate_sequence_target_fails() {
    let engine = Engine::new();
    let err = engine.convert::<bool>(vec![true, false]).await.unwrap_err();
    assert!(matches!(err, ConvertError::ListConverterMissing { .. }));
}

#[tokio::test]
async fn convert_sequence_applies_convert_element_wise() {
    let engine = Engine::new();
    engine
        .add_mapping::<i32, String>(|n| n.to_string())
        .expect("register");

    let texts = engine
        .convert_sequence::<String>(vec![1i32, 2, 3])
        .await
        .expect("convert");
    assert_eq!(
        texts,
        vec![
            Some("1".to_string()),
            Some("2".to_string()),
            Some("3".to_string())
        ]
    );
}

#[tokio::test]
async fn convert_sequence_preserves_absent_elements() {
    let engine = Engine::new();
    let numbers = engine
        .convert_sequence::<i32>(vec![Some(1i32), None, Some(3i32)])
        .await
        .expect("convert");
    assert_eq!(numbers, vec![Some(1), None, Some(3)]);
}

#[tokio::test]
async fn convert_sequence_rejects_non_sequence_input() {
    let engine = Engine::new();
    let err = engine.convert_sequence::<String>(5u32).await.unwrap_err();
    assert!(matches!(err, ConvertError::MapperNotFound { .. }));
}

// ---------------------------------------------------------------------------
// Keyed-mapping coercion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn auto_mapping_copies_tables() {
    let engine = Engine::new();
    wrap_string(&engine);
    engine
        .add_auto_mapping::<FromObject, ToObject>()
        .expect("register");

    let mut table = HashMap::new();
    table.insert(1, "1".to_string());
    table.insert(2, "2".to_string());
    table.insert(3, "3".to_string());

    let from = FromObject {
        table: table.clone(),
        ..FromObject::default()
    };

    let to = engine
        .convert::<ToObject>(from)
        .await
        .expect("convert")
        .expect("present");
    assert_eq!(to.table, table);
}

#[tokio::test]
async fn map_converts_entry_wise_into_other_map_type() {
    let engine = Engine::new();
    engine
        .add_mapping::<i32, String>(|n| n.to_string())
        .expect("register");

    let mut source = HashMap::new();
    source.insert(1, 10i32);
    source.insert(2, 20i32);

    let converted = engine
        .convert::<BTreeMap<i32, String>>(source)
        .await
        .expect("convert")
        .expect("present");

    let mut expected = BTreeMap::new();
    expected.insert(1, "10".to_string());
    expected.insert(2, "20".to_string());
    assert_eq!(converted, expected);
}

#[tokio::test]
async fn map_value_with_non_map_target_fails() {
    let engine = Engine::new();
    let mut source = HashMap::new();
    source.insert(1i32, "one".to_string());

    let err = engine.convert::<bool>(source).await.unwrap_err();
    assert!(matches!(err, ConvertError::MapperNotFound { .. }));
}

// ---------------------------------------------------------------------------
// Overwrite protocol, removal and reset
// ---------------------------------------------------------------------------

#[tokio::test]
async fn permitted_overwrite_switches_to_new_converter() {
    let engine = Engine::new();
    wrap_string(&engine);
    engine
        .add_auto_mapping::<FromObject, ToObject>()
        .expect("register");

    engine.set_overwrite_policy(|_, _| true);
    engine
        .add_mapping::<FromObject, ToObject>(|_| ToObject {
            name: "NewMapper!".into(),
            ..ToObject::default()
        })
        .expect("overwrite");

    let result = engine
        .convert::<ToObject>(FromObject::default())
        .await
        .expect("convert")
        .expect("present");
    assert_eq!(result.name, "NewMapper!");
}

#[tokio::test]
async fn denied_overwrite_keeps_existing_converter() {
    let engine = Engine::new();
    wrap_string(&engine);
    engine
        .add_auto_mapping::<FromObject, ToObject>()
        .expect("register");

    engine.set_overwrite_policy(|_, _| false);
    let err = engine
        .add_mapping::<FromObject, ToObject>(|_| ToObject {
            name: "NewMapper!".into(),
            ..ToObject::default()
        })
        .unwrap_err();
    assert!(matches!(err, ConvertError::AlreadyDefined { .. }));

    let from = FromObject {
        name: "kept".into(),
        ..FromObject::default()
    };
    let result = engine
        .convert::<ToObject>(from)
        .await
        .expect("convert")
        .expect("present");
    assert_eq!(result.name, "kept");
}

#[tokio::test]
async fn removed_mapping_is_gone() {
    let engine = Engine::new();
    engine
        .add_mapping::<i32, bool>(|n| n > 0)
        .expect("register");
    assert!(engine.remove_mapping::<i32, bool>());

    let err = engine.convert::<bool>(1i32).await.unwrap_err();
    assert!(matches!(err, ConvertError::MapperNotFound { .. }));
}

#[tokio::test]
async fn reset_returns_engine_to_clean_state() {
    let engine = Engine::new();
    engine
        .add_mapping::<i32, bool>(|n| n > 0)
        .expect("register");
    engine.reset();

    assert!(engine.registry().is_empty());
    let err = engine.convert::<bool>(1i32).await.unwrap_err();
    assert!(matches!(err, ConvertError::MapperNotFound { .. }));

    engine
        .add_mapping::<i32, bool>(|n| n > 0)
        .expect("re-register after reset");
}

#[tokio::test]
async fn builder_sets_default_property_source_and_policy() {
    let engine = Engine::builder()
        .property_source(PropertySource::Source)
        .overwrite_policy(|_, _| true)
        .build();

    engine
        .add_auto_mapping::<FromObject, FailingToObject>()
        .expect("register");

    // Source-driven: FromObject's extra fields have no counterpart.
    let err = engine
        .convert::<FailingToObject>(FromObject::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::PropertyMappingMissing { .. }));

    // Policy installed at build time permits replacement.
    engine
        .add_mapping::<FromObject, FailingToObject>(|from| FailingToObject { name: from.name })
        .expect("overwrite");

    let from = FromObject {
        name: "Testsson".into(),
        ..FromObject::default()
    };
    let to = engine
        .convert::<FailingToObject>(from)
        .await
        .expect("convert")
        .expect("present");
    assert_eq!(to.name, "Testsson");
}

#[tokio::test(flavor = "multi_thread")]
async fn lookups_stay_safe_during_concurrent_registration() {
    let engine = Engine::new();
    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                // First registration wins; the rest collide and are ignored.
                let _ = engine.add_mapping::<u32, u64>(u64::from);
            } else {
                let _ = engine.convert::<u64>(1u32).await;
            }
        }));
    }
    for handle in handles {
        handle.await.expect("join");
    }
    assert!(engine.has_mapping::<u32, u64>());
}

// ---------------------------------------------------------------------------
// Converter sets
// ---------------------------------------------------------------------------

#[derive(ConverterSet)]
struct Converters {
    #[remap(converter)]
    length: Mapping<String, u64>,
    #[remap(converter)]
    flag: Mapping<u64, bool>,
}

#[tokio::test]
async fn converter_set_registers_every_held_mapping() {
    let engine = Engine::new();
    let converters = Converters {
        length: Mapping::new(|text: String| text.len() as u64),
        flag: Mapping::new_async(|n: u64| async move { n > 3 }),
    };
    converters.register_into(&engine).expect("register set");

    let length = engine
        .convert::<u64>(String::from("tiny"))
        .await
        .expect("convert");
    assert_eq!(length, Some(4));

    let flag = engine.convert::<bool>(7u64).await.expect("convert");
    assert_eq!(flag, Some(true));
}

#[tokio::test]
async fn converter_set_respects_overwrite_protocol() {
    let engine = Engine::new();
    let converters = Converters {
        length: Mapping::new(|text: String| text.len() as u64),
        flag: Mapping::new(|n: u64| n > 3),
    };
    converters.register_into(&engine).expect("first");

    let err = converters.register_into(&engine).unwrap_err();
    assert!(matches!(err, ConvertError::AlreadyDefined { .. }));
}
