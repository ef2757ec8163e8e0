
use fixtures::{ensure_env_logger_initialized, ident, int, ship_container, string};
use kdlc::dump::{format_resource, hex_dump};
use kdlc::{
    BinaryType, MemoryStore, PopulateError, Rect, Resource, ResourceError, ResourceStore, Template, Value,
};

fn template(fields: &[(&str, BinaryType)]) -> Template {
    Template::from_slots(fields).expect("template")
}

#[test]
fn primitive_round_trip() {
    ensure_env_logger_initialized();
    let t = template(&[
        ("a", BinaryType::Hbyt),
        ("b", BinaryType::Dwrd),
        ("c", BinaryType::Rect),
        ("d", BinaryType::Pstr),
        ("e", BinaryType::Cnnn(4)),
    ]);

    let mut r = Resource::new("test", 1, "one", &t);
    r.write_byte("a", 200).unwrap();
    r.write_signed_short("b", -300).unwrap();
    r.write_rect("c", Rect::new(1, -2, 3, -4)).unwrap();
    r.write_pstr("d", "hi").unwrap();
    r.write_cstr("e", "ab").unwrap();
    assert!(r.is_complete());

    let bytes = r.assemble().unwrap();
    assert_eq!(
        bytes,
        [
            200, // a
            0xFE, 0xD4, // b
            0, 1, 0xFF, 0xFE, 0, 3, 0xFF, 0xFC, // c
            2, b'h', b'i', // d
            b'a', b'b', 0, 0, // e
        ]
    );

    let mut back = Resource::new("test", 1, "one", &t);
    back.import(&bytes).unwrap();
    assert_eq!(back.value("a"), Some(&Value::U8(200)));
    assert_eq!(back.value("b"), Some(&Value::I16(-300)));
    assert_eq!(back.value("c"), Some(&Value::Rect(Rect::new(1, -2, 3, -4))));
    assert_eq!(back.value("d"), Some(&Value::string("hi")));
    assert_eq!(
        back.value("e"),
        Some(&Value::String { text: "ab".into(), length: 4 })
    );
    assert_eq!(back.assemble().unwrap(), bytes);
}

#[test]
fn wide_integers_round_trip() {
    let t = template(&[
        ("sq", BinaryType::Dqad),
        ("uq", BinaryType::Hqad),
        ("sl", BinaryType::Dlng),
        ("ul", BinaryType::Hlng),
        ("sb", BinaryType::Dbyt),
        ("uw", BinaryType::Hwrd),
    ]);
    let mut r = Resource::new("test", 2, "", &t);
    r.write_signed_quad("sq", i64::MIN).unwrap();
    r.write_quad("uq", u64::MAX).unwrap();
    r.write_signed_long("sl", -1).unwrap();
    r.write_long("ul", 0xDEAD_BEEF).unwrap();
    r.write_signed_byte("sb", -128).unwrap();
    r.write_short("uw", 0x0102).unwrap();
    let bytes = r.assemble().unwrap();
    assert_eq!(bytes.len(), t.fixed_size().unwrap());
    assert_eq!(&bytes[8..16], &[0xFF; 8]);
    assert_eq!(&bytes[bytes.len() - 2..], &[0x01, 0x02]);

    let mut back = Resource::new("test", 2, "", &t);
    back.import(&bytes).unwrap();
    assert_eq!(back.value("sq"), Some(&Value::I64(i64::MIN)));
    assert_eq!(back.value("ul"), Some(&Value::U32(0xDEAD_BEEF)));
    assert_eq!(back.value("sb"), Some(&Value::I8(-128)));
}

#[test]
fn fixed_strings_keep_a_terminator() {
    let t = template(&[("s", BinaryType::Cnnn(4)), ("n", BinaryType::Hbyt)]);
    let mut r = Resource::new("test", 3, "", &t);
    r.write_cstr("s", "abcdef").unwrap();
    r.write_byte("n", 9).unwrap();
    let bytes = r.assemble().unwrap();
    assert_eq!(bytes, [b'a', b'b', b'c', 0, 9]);

    let mut back = Resource::new("test", 3, "", &t);
    back.import(&bytes).unwrap();
    assert_eq!(back.value("s").and_then(Value::as_str), Some("abc"));
    assert_eq!(back.value("n"), Some(&Value::U8(9)));
}

#[test]
fn c_strings_stop_at_nul_or_end() {
    let t = template(&[("a", BinaryType::Cstr), ("b", BinaryType::Cstr)]);
    let mut r = Resource::new("test", 4, "", &t);
    r.import(b"first\0second").unwrap();
    assert_eq!(
        r.value("a"),
        Some(&Value::String { text: "first".into(), length: 0 })
    );
    assert_eq!(r.value("b").and_then(Value::as_str), Some("second"));
    assert_eq!(r.assemble().unwrap(), b"first\0second\0");
}

#[test]
fn long_pascal_strings_are_truncated() {
    let t = template(&[("p", BinaryType::Pstr)]);
    let mut r = Resource::new("test", 5, "", &t);
    r.write_pstr("p", &"x".repeat(300)).unwrap();
    let bytes = r.assemble().unwrap();
    assert_eq!(bytes.len(), 256);
    assert_eq!(bytes[0], 255);
}

#[test]
fn invalid_tag_stops_populate_but_keeps_earlier_slots() {
    let t = template(&[
        ("first", BinaryType::Hwrd),
        ("broken", BinaryType::from_raw(0x7777)),
        ("last", BinaryType::Hbyt),
    ]);
    let mut r = Resource::new("test", 6, "", &t);
    let err = r.import(&[0x00, 0x2A, 0x01]).unwrap_err();
    assert!(matches!(
        err,
        PopulateError::UnsupportedType { ref field, tag: BinaryType::Invalid(0x7777) } if field == "broken"
    ));
    assert_eq!(r.value("first"), Some(&Value::U16(42)));
    assert!(!r.is_written("last"));
}

#[test]
fn truncated_data_names_the_field() {
    let t = template(&[("a", BinaryType::Hbyt), ("b", BinaryType::Hlng)]);
    let mut r = Resource::new("test", 7, "", &t);
    let err = r.import(&[1, 2, 3]).unwrap_err();
    assert!(matches!(err, PopulateError::Truncated { ref field, .. } if field == "b"));
    assert_eq!(r.value("a"), Some(&Value::U8(1)));
}

#[test]
fn assemble_rejects_missing_and_mismatched_values() {
    let t = template(&[("a", BinaryType::Hwrd), ("b", BinaryType::Pstr)]);
    let mut r = Resource::new("test", 8, "", &t);
    r.write_short("a", 1).unwrap();
    assert!(matches!(r.assemble(), Err(ResourceError::MissingValue(ref f)) if f == "b"));

    r.write_byte("b", 1).unwrap();
    assert!(!r.is_complete());
    assert!(matches!(
        r.assemble(),
        Err(ResourceError::TypeMismatch { ref field, expected: BinaryType::Pstr, found: "u8" }) if field == "b"
    ));

    assert!(matches!(r.write_short("zz", 1), Err(ResourceError::UnknownField(_))));
}

#[test]
fn populate_from_store() {
    ensure_env_logger_initialized();
    let ship = ship_container();

    let mut r = Resource::of(&ship, 128, "Shuttle");
    r.apply_defaults(&ship).unwrap();
    r.write_rect("Bounds", Rect::new(0, 0, 32, 64)).unwrap();
    r.write_token("Short", &string("shuttle")).unwrap();
    r.write_field(&ship, &ident("Position"), &[int("-5"), int("0x10")]).unwrap();
    r.write_token("Blob", &int("0xCAFE")).unwrap();
    r.write_cstr("Notes", "small craft").unwrap();

    let mut store = MemoryStore::new();
    store.add_resource(&r).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.name("shïp", 128), Some("Shuttle"));

    let mut back = Resource::of(&ship, 128, "Shuttle");
    back.populate(&store).unwrap();
    assert!(back.is_complete());
    assert_eq!(back.value("Mass"), Some(&Value::U16(10)));
    assert_eq!(back.value("Shields"), Some(&Value::I16(0)));
    assert_eq!(back.value("Name").and_then(Value::as_str), Some("Unnamed"));
    assert_eq!(back.value("Short").and_then(Value::as_str), Some("shuttle"));
    assert_eq!(back.value("PosX"), Some(&Value::I32(-5)));
    assert_eq!(back.value("PosY"), Some(&Value::I32(16)));
    assert_eq!(back.value("Blob").and_then(Value::as_bytes), Some(&[0xCA, 0xFE][..]));
    assert_eq!(back.value("Notes").and_then(Value::as_str), Some("small craft"));
    assert_eq!(back.assemble().unwrap(), store.find("shïp", 128).unwrap());
}

#[test]
fn populate_missing_resource() {
    let ship = ship_container();
    let store = MemoryStore::new();
    let mut r = Resource::of(&ship, 129, "Ghost");
    let err = r.populate(&store).unwrap_err();
    assert!(matches!(err, PopulateError::NotFound { ref code, id: 129 } if code == "shïp"));
    assert!(!r.is_written("Mass"));
}

#[test]
fn populate_through_a_trait_object() {
    let t = template(&[("a", BinaryType::Hbyt)]);
    let mut store = MemoryStore::new();
    store.insert("test", 1, "one", vec![7]);
    let dyn_store: &dyn ResourceStore = &store;

    let mut r = Resource::new("test", 1, "one", &t);
    r.populate(dyn_store).unwrap();
    assert_eq!(r.value("a"), Some(&Value::U8(7)));
}

#[test]
fn resource_listing() {
    let t = template(&[("Mass", BinaryType::Hwrd), ("Name", BinaryType::Pstr)]);
    let mut r = Resource::new("shïp", 128, "Shuttle", &t);
    r.write_short("Mass", 10).unwrap();
    assert_eq!(
        format_resource(&r),
        "shïp #128 \"Shuttle\"\n  Mass HWRD = 10\n  Name PSTR = <unset>\n"
    );

    r.write_pstr("Name", "A").unwrap();
    let dump = hex_dump(&r.assemble().unwrap());
    assert!(dump.starts_with("00000000  00 0a 01 41 "));
}

#[test]
fn nul_inside_c_string_is_rejected() {
    let t = template(&[("c", BinaryType::Cstr), ("n", BinaryType::Hbyt)]);
    let mut r = Resource::new("test", 9, "", &t);
    assert!(matches!(
        r.write_cstr("c", "a\0b"),
        Err(ResourceError::InvalidLiteral { ref field, .. }) if field == "c"
    ));
    assert!(!r.is_written("c"));

    r.write_value("c", Value::string("a\0b")).unwrap();
    r.write_byte("n", 7).unwrap();
    assert!(matches!(r.assemble(), Err(ResourceError::InvalidLiteral { .. })));

    r.write_cstr("c", "ab").unwrap();
    let bytes = r.assemble().unwrap();
    let mut back = Resource::new("test", 9, "", &t);
    back.import(&bytes).unwrap();
    assert_eq!(back.value("n"), Some(&Value::U8(7)));
}

#[test]
fn nul_inside_fixed_string_literal_is_rejected() {
    let t = template(&[("s", BinaryType::Cnnn(8))]);
    let mut r = Resource::new("test", 10, "", &t);
    assert!(matches!(
        r.write_token("s", &string("x\0y")),
        Err(ResourceError::InvalidLiteral { .. })
    ));
}

#[test]
fn truncated_pascal_string_stays_valid_utf8() {
    let t = template(&[("p", BinaryType::Pstr), ("n", BinaryType::Hbyt)]);
    let mut r = Resource::new("test", 11, "", &t);
    r.write_pstr("p", &"é".repeat(128)).unwrap();
    r.write_byte("n", 3).unwrap();
    let bytes = r.assemble().unwrap();
    assert_eq!(bytes[0], 254);

    let mut back = Resource::new("test", 11, "", &t);
    back.import(&bytes).unwrap();
    assert_eq!(back.value("p").and_then(Value::as_str), Some("é".repeat(127).as_str()));
    assert_eq!(back.value("n"), Some(&Value::U8(3)));
}
