//! Purpose: End-to-end decoding through the public API.
//! Role: Covers JSON, YAML, auto-detection, mapping input, and record-to-record copies.
use std::collections::HashMap;

use serde::Deserialize;
use time::OffsetDateTime;
use time::macros::datetime;
use weakdecode::{
    Decoder, DecoderConfig, ErrorKind, Mapping, Value, auto_decode, decode_json, decode_mapping,
    decode_yaml, record, to_map,
};

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
struct Settings {
    #[serde(rename = "ID")]
    id: i64,
    active: bool,
    tags: Vec<String>,
}

record! {
    Settings {
        id: r#"json:"ID" yaml:"id""#,
        active: r#"json:"active" yaml:"active""#,
        tags: r#"json:"tags" yaml:"tags""#,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
struct Inner {
    value: String,
}

record! { Inner { value: r#"json:"value""# } }

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
struct Middle {
    inner: Inner,
}

record! { Middle { inner: r#"json:"inner""# } }

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
struct Outer {
    outer: Middle,
}

record! { Outer { outer: r#"json:"outer""# } }

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
struct Profile {
    name: String,
    age: u8,
    score: f64,
    email: Option<String>,
    joined: Option<OffsetDateTime>,
    skills: HashMap<String, i32>,
    ratio: String,
    extra: Value,
}

record! {
    Profile {
        name: r#"json:"name""#,
        age: r#"json:"age""#,
        score: r#"json:"score""#,
        email: r#"json:"email,omitempty""#,
        joined: r#"json:"joined""#,
        skills: r#"json:"skills""#,
        ratio: r#"json:"ratio""#,
        extra: r#"json:"extra""#,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
struct Only {
    id: i64,
}

record! { Only { id: r#"json:"id""# } }

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
struct Member {
    id: i64,
    nick: Option<String>,
    secret: Option<String>,
}

record! {
    Member {
        id: r#"json:"id" yaml:"id""#,
        nick: r#"json:"nickname" yaml:"nickname""#,
        secret: r#"json:"-" yaml:"-""#,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
struct Team {
    lead: Member,
    members: Vec<Member>,
}

record! {
    Team {
        lead: r#"json:"lead""#,
        members: r#"json:"members""#,
    }
}

#[test]
fn yaml_scenario_coerces_every_field() {
    let mut settings = Settings::default();
    decode_yaml("id: \"42\"\nactive: \"yes\"\ntags: \"a,b\"", &mut settings).unwrap();
    assert_eq!(
        settings,
        Settings {
            id: 42,
            active: true,
            tags: vec!["a".to_string(), "b".to_string()],
        }
    );
}

#[test]
fn json_fast_path_and_fallback_agree() {
    let mut fast = Settings::default();
    decode_json(r#"{"ID": 7, "active": true, "tags": ["x"]}"#, &mut fast).unwrap();

    let mut slow = Settings::default();
    decode_json(r#"{"ID": "7", "active": "on", "tags": "x"}"#, &mut slow).unwrap();

    assert_eq!(fast, slow);
}

#[test]
fn case_insensitive_field_names() {
    let mut settings = Settings::default();
    decode_json(r#"{"Id": 3, "ACTIVE": "1", "Tags": []}"#, &mut settings).unwrap();
    assert_eq!(settings.id, 3);
    assert!(settings.active);

    let mut member = Member::default();
    decode_json(r#"{"id": 1, "NICK": "bob"}"#, &mut member).unwrap();
    assert_eq!(member.nick.as_deref(), Some("bob"));
}

#[test]
fn tag_names_win_over_rust_field_names_by_default() {
    let expected = Member {
        id: 1,
        nick: Some("bob".to_string()),
        secret: None,
    };

    let mut member = Member::default();
    decode_json(r#"{"id": 1, "nickname": "bob"}"#, &mut member).unwrap();
    assert_eq!(member, expected);

    let mut member = Member::default();
    decode_yaml("id: 1\nnickname: bob\n", &mut member).unwrap();
    assert_eq!(member, expected);

    let mut member = Member::default();
    auto_decode("id: 1\nnickname: bob\n", &mut member).unwrap();
    assert_eq!(member, expected);
}

#[test]
fn excluded_fields_stay_empty_by_default() {
    let mut member = Member::default();
    decode_json(r#"{"id": 2, "secret": "s", "nick": "x"}"#, &mut member).unwrap();
    assert_eq!(member.secret, None);
    assert_eq!(member.nick.as_deref(), Some("x"));
}

#[test]
fn nested_records_resolve_tags_by_default() {
    let mut team = Team::default();
    decode_json(
        r#"{"lead": {"id": 1, "nickname": "ann"}, "members": [{"id": 2, "nickname": "bo"}]}"#,
        &mut team,
    )
    .unwrap();
    assert_eq!(team.lead.nick.as_deref(), Some("ann"));
    assert_eq!(team.members[0].nick.as_deref(), Some("bo"));
}

#[test]
fn fast_and_slow_paths_agree_on_tagged_documents() {
    let input = r#"{"id": 4, "nickname": "dee", "other": true}"#;
    let mut fast = Member::default();
    decode_json(input, &mut fast).unwrap();

    let mut slow = Member::default();
    Decoder::new(DecoderConfig::new().with_zero_destination_first(false))
        .decode(input, &mut slow)
        .unwrap();
    assert_eq!(fast, slow);
}

#[test]
fn three_level_nesting_reaches_innermost_field() {
    let mut outer = Outer::default();
    decode_json(r#"{"outer": {"inner": {"value": "deep"}}}"#, &mut outer).unwrap();
    assert_eq!(outer.outer.inner.value, "deep");
}

#[test]
fn weak_profile_from_json() {
    let input = r#"{
        "name": "Ada",
        "age": "36",
        "score": "87.5",
        "email": null,
        "joined": "2024-02-03 04:05:06",
        "skills": {"rust": "5", "go": 3.9},
        "ratio": 0.25,
        "extra": {"free": ["form", 1]}
    }"#;
    let mut profile = Profile::default();
    decode_json(input, &mut profile).unwrap();
    assert_eq!(profile.name, "Ada");
    assert_eq!(profile.age, 36);
    assert_eq!(profile.score, 87.5);
    assert_eq!(profile.email, None);
    assert_eq!(profile.joined, Some(datetime!(2024-02-03 4:05:06 UTC)));
    assert_eq!(profile.skills.get("rust"), Some(&5));
    assert_eq!(profile.skills.get("go"), Some(&3));
    assert_eq!(profile.ratio, "0.25");
    assert!(profile.extra.get("free").is_some());
}

#[test]
fn nested_failure_reports_location() {
    let mut profile = Profile::default();
    let err = decode_json(r#"{"skills": {"rust": "lots"}}"#, &mut profile).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeConversion);
    assert_eq!(err.path_display().as_deref(), Some("skills[\"rust\"]"));
    let conversion = err.conversion().unwrap();
    assert_eq!(conversion.value, "\"lots\"");
    assert_eq!(conversion.target_type, "i32");
}

#[test]
fn out_of_range_is_a_conversion_error() {
    let mut profile = Profile::default();
    let err = decode_json(r#"{"age": "300"}"#, &mut profile).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeConversion);
    assert_eq!(err.path_display().as_deref(), Some("age"));
}

#[test]
fn strict_mode_rejects_textual_numbers() {
    let decoder = Decoder::new(DecoderConfig::new().with_weakly_typed(false));
    let mut only = Only::default();
    let err = decoder.decode(r#"{"id": "1"}"#, &mut only).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeConversion);
    decoder.decode(r#"{"id": 1}"#, &mut only).unwrap();
    assert_eq!(only.id, 1);
}

#[test]
fn unknown_keys_fail_only_when_denied() {
    let input = r#"{"id": 1, "extra": 2}"#;
    let mut only = Only::default();
    decode_json(input, &mut only).unwrap();
    assert_eq!(only.id, 1);

    let strict = Decoder::new(DecoderConfig::new().with_ignore_unknown_keys(false));
    let err = strict.decode(input, &mut only).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownField);
    assert!(err.message().unwrap().contains("extra"));
}

#[test]
fn auto_decode_handles_each_shape() {
    let mut only = Only::default();
    auto_decode(r#"{"id": 1}"#, &mut only).unwrap();
    assert_eq!(only.id, 1);
    auto_decode("id: 2\nname: x", &mut only).unwrap();
    assert_eq!(only.id, 2);
    auto_decode("{id: 3, name: x}", &mut only).unwrap();
    assert_eq!(only.id, 3);
    auto_decode(b"id: \"4\"".as_slice(), &mut only).unwrap();
    assert_eq!(only.id, 4);
}

#[test]
fn mapping_input_skips_parsing() {
    let mut mapping = Mapping::new();
    mapping.insert("id".to_string(), Value::from("9"));
    let mut only = Only::default();
    decode_mapping(&mapping, &mut only).unwrap();
    assert_eq!(only.id, 9);

    let mut other = Only::default();
    Decoder::default()
        .decode(&Value::Mapping(mapping), &mut other)
        .unwrap();
    assert_eq!(other, only);
}

#[test]
fn single_entry_document_fills_a_scalar() {
    let mut port = 0u16;
    decode_json(r#"{"port": "8080"}"#, &mut port).unwrap();
    assert_eq!(port, 8080);

    let mut names: Vec<String> = Vec::new();
    decode_yaml("names: a, b", &mut names).unwrap();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn records_copy_into_other_record_types() {
    let settings = Settings {
        id: 5,
        active: true,
        tags: vec!["t".to_string()],
    };
    let source = weakdecode::Coerce::project(&settings);

    #[derive(Clone, Debug, Default, PartialEq, Deserialize)]
    struct Summary {
        id: String,
        tags: Vec<String>,
    }
    record! {
        Summary {
            id: r#"json:"ID""#,
            tags: r#"json:"tags""#,
        }
    }

    let mut summary = Summary::default();
    Decoder::default().decode(&source, &mut summary).unwrap();
    assert_eq!(summary.id, "5");
    assert_eq!(summary.tags, vec!["t"]);
}

#[test]
fn keep_existing_merges_into_nested_records() {
    let decoder = Decoder::new(DecoderConfig::new().with_zero_destination_first(false));
    let mut profile = Profile {
        name: "kept".to_string(),
        age: 1,
        ..Profile::default()
    };
    decoder.decode(r#"{"age": 2}"#, &mut profile).unwrap();
    assert_eq!(profile.name, "kept");
    assert_eq!(profile.age, 2);
}

#[test]
fn decode_then_project_round_trips_through_json_names() {
    let mut settings = Settings::default();
    decode_yaml("id: 11\nactive: off\ntags: [a]\n", &mut settings).unwrap();
    let projected = to_map(&settings).unwrap();
    assert_eq!(projected.get("ID"), Some(&Value::Int(11)));
    assert_eq!(projected.get("active"), Some(&Value::Bool(false)));
}

#[test]
fn parse_errors_keep_location_hint() {
    let mut only = Only::default();
    let err = decode_json("{\n\"id\": }", &mut only).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.hint().unwrap().starts_with("line 2"));
}
