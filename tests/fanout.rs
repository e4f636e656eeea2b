// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod common;

use std::sync::Arc;

use common::Capture;
use common::Failing;
use logfan::Descriptor;
use logfan::Error;
use logfan::ErrorKind;
use logfan::ErrorPolicy;
use logfan::Factory;
use logfan::Level;
use logfan::Style;
use logfan::clock::ManualClock;
use logfan::color::SourceColor;
use logfan::value::Node;
use logfan::value::Value;
use logfan::values;

fn clock() -> ManualClock {
    ManualClock::new("2024-08-11T22:44:57.172Z".parse().unwrap())
}

#[test]
fn test_target_receives_event_iff_level_passes() {
    let captures = Level::ALL.map(|_| Arc::new(Capture::default()));
    let factory = Factory::new(
        Level::ALL
            .iter()
            .zip(&captures)
            .map(|(level, capture)| Descriptor::stream(capture.clone()).log_level(*level)),
    )
    .unwrap();
    let logger = factory.create_logger("svc", None, None).unwrap();

    for level in Level::ALL {
        logger.log(level, &values!["x"]).unwrap();
    }

    for (threshold, capture) in Level::ALL.iter().zip(&captures) {
        assert_eq!(capture.records().len(), threshold.rank() as usize, "{threshold}");
    }
}

#[test]
fn test_two_targets_with_aligned_text() {
    let a = Arc::new(Capture::default());
    let b = Arc::new(Capture::default());
    let factory = Factory::builder()
        .target(
            Descriptor::stream(a.clone())
                .style(Style::Json)
                .log_level(Level::Error),
        )
        .target(
            Descriptor::stream(b.clone())
                .log_level(Level::Trace)
                .uniform_length(true),
        )
        .clock(clock())
        .build()
        .unwrap();

    let svc = factory.create_logger("svc", None, None).unwrap();
    let svc2 = factory.create_logger("svc2", None, None).unwrap();
    svc.info(&values!["x"]).unwrap();
    svc2.warn(&values!["y", "z"]).unwrap();
    svc.error(&values!["boom"]).unwrap();

    assert_eq!(
        a.records(),
        [r#"{"timestamp":1723416297172,"level":"ERROR","component":"svc","source":null,"msg":["boom"]}"#]
    );
    assert_eq!(
        b.records(),
        [
            "[22:44:57.172] [INFO]   [svc] x",
            "[22:44:57.172] [WARN]  [svc2] y z",
            "[22:44:57.172] [ERROR]  [svc] boom",
        ]
    );
}

#[test]
fn test_json_lines_parse_with_cycles() {
    let capture = Arc::new(Capture::default());
    let factory = Factory::new(Descriptor::stream(capture.clone()).style(Style::Json)).unwrap();
    let logger = factory.create_logger("svc", Some("cycle"), None).unwrap();

    let a = Node::new(Value::Object(vec![]));
    a.update(|v| v.insert("b", Value::Array(vec![a.clone().into()])));
    logger
        .info(&[Value::from(&a), Value::Undefined, Value::Float(f64::NAN)])
        .unwrap();
    a.set(Value::Null);

    let lines = capture.records();
    assert_eq!(lines.len(), 1);
    let record: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(record["source"], "cycle");
    assert_eq!(
        record["msg"],
        serde_json::json!([{"b": ["[Circular]"]}, "undefined", null])
    );
}

#[test]
fn test_equivalent_colors_render_identically() {
    let capture = Arc::new(Capture::default());
    let factory = Factory::builder()
        .target(Descriptor::stream(capture.clone()).color(true))
        .clock(clock())
        .build()
        .unwrap();

    let colors = [
        SourceColor::from("#1e90ff"),
        SourceColor::from("1E90FF"),
        SourceColor::from(0x1e90ff_u32),
        SourceColor::from([30u8, 144, 255]),
    ];
    for color in colors {
        let logger = factory.create_logger("svc", None, Some(color)).unwrap();
        logger.info(&values!["x"]).unwrap();
    }

    let lines = capture.records();
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|line| line == &lines[0]));
    assert!(lines[0].contains("\x1b[38;2;30;144;255m[svc]\x1b[0m"));
}

#[test]
fn test_invalid_colors_leave_factory_untouched() {
    let factory = Factory::new(Descriptor::stdout()).unwrap();
    let invalid = [
        SourceColor::from(0x1000000_u32),
        SourceColor::from(vec![0, 256, 0]),
        SourceColor::from(vec![0, 0]),
        SourceColor::from("#12345"),
        SourceColor::from("#gggggg"),
    ];
    for color in invalid {
        let err = factory
            .create_logger("a-very-long-component", None, Some(color))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
    assert_eq!(factory.max_name_len(), 0);
}

#[test]
fn test_max_name_len_only_grows() {
    let factory = Factory::new(Descriptor::stdout()).unwrap();
    factory.create_logger("db", Some("pool"), None).unwrap();
    assert_eq!(factory.max_name_len(), 7);
    factory.create_logger("x", None, None).unwrap();
    assert_eq!(factory.max_name_len(), 7);
    factory.create_logger("scheduler", None, None).unwrap();
    assert_eq!(factory.max_name_len(), 9);
}

#[test]
fn test_throw_surfaces_after_other_targets_settle() {
    let capture = Arc::new(Capture::default());
    let failing = Arc::new(Failing::default());
    let factory = Factory::new([
        Descriptor::stream(capture.clone()).error_policy(ErrorPolicy::Throw),
        Descriptor::stream(failing.clone()).error_policy(ErrorPolicy::Throw),
        Descriptor::stream(failing.clone()).error_policy(ErrorPolicy::Ignore),
    ])
    .unwrap();
    let logger = factory.create_logger("svc", None, None).unwrap();

    let err = logger.warn(&values!["x"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Delivery);
    assert_eq!(err.context("target"), Some("1"));
    assert_eq!(capture.records().len(), 1);
    assert_eq!(failing.attempts(), 2);
}

#[test]
fn test_panicking_callback_is_a_failed_delivery() {
    let capture = Arc::new(Capture::default());
    let factory = Factory::new([
        Descriptor::function(|_: &str| -> Result<(), Error> { panic!("callback exploded") })
            .error_policy(ErrorPolicy::Throw),
        Descriptor::stream(capture.clone()),
    ])
    .unwrap();
    let logger = factory.create_logger("svc", None, None).unwrap();

    let err = logger.info(&values!["x"]).unwrap_err();
    assert_eq!(err.context("target"), Some("0"));
    assert!(format!("{err:?}").contains("callback exploded"));
    assert_eq!(capture.records().len(), 1);
}

#[test]
fn test_destroy_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let borrowed = Arc::new(Failing::default());
    let factory = Factory::new([
        Descriptor::file(path.to_string_lossy()),
        Descriptor::stream(borrowed.clone()).error_policy(ErrorPolicy::Ignore),
    ])
    .unwrap();
    let logger = factory.create_logger("svc", None, None).unwrap();
    logger.info(&values!["before"]).unwrap();

    factory.destroy();
    factory.destroy();
    assert!(factory.is_destroyed());
    assert!(logger.is_destroyed());
    assert_eq!(borrowed.closed(), 0);

    let err = logger.info(&values!["after"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Destroyed);
    let err = factory.create_logger("late", None, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Destroyed);

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.ends_with("[INFO] [svc] before\n"));
}

#[test]
fn test_logger_does_not_keep_factory_alive() {
    let factory = Factory::new(Descriptor::stdout()).unwrap();
    let logger = factory.create_logger("svc", None, None).unwrap();
    drop(factory);
    assert!(logger.is_destroyed());
    assert_eq!(
        logger.info(&values!["x"]).unwrap_err().kind(),
        ErrorKind::Destroyed
    );
}

#[test]
fn test_invalid_descriptor_rejects_whole_factory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("first.log");
    let err = Factory::new([
        Descriptor::file(path.to_string_lossy()),
        Descriptor::post("not a url"),
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_multiline_text_keeps_prefix() {
    let capture = Arc::new(Capture::default());
    let factory = Factory::builder()
        .target(Descriptor::stream(capture.clone()).full_timestamps(true))
        .clock(clock())
        .build()
        .unwrap();
    let logger = factory.create_logger("svc", None, None).unwrap();
    logger
        .debug(&values!["line one\nline two", 3])
        .unwrap();

    assert_eq!(
        capture.records(),
        ["[2024-08-11T22:44:57.172Z] [DEBUG] [svc] line one\n[2024-08-11T22:44:57.172Z] [DEBUG] [svc] line two 3"]
    );
}
