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

use crate::Error;
use crate::Level;
use crate::color::ColorFn;
use crate::color::LevelColor;
use crate::layout::Layout;
use crate::layout::LayoutOptions;
use crate::layout::clock_time;
use crate::layout::inspect;
use crate::layout::iso8601;
use crate::record::Event;
use crate::record::display_name_len;
use crate::value::Value;

/// A layout that formats log events as optionally colored text.
///
/// Output format, with uniform length enabled and a longest display name of `db/pool`:
///
/// ```text
/// [22:44:57.172] [ERROR]      [db] connection lost { retries: 3 }
/// [22:44:57.172] [WARN]  [db/pool] pool exhausted
/// [22:44:57.172] [INFO]       [db] multi-line
/// [22:44:57.172] [INFO]       [db] payloads repeat the prefix
/// ```
///
/// String messages are written verbatim; other values are rendered with [`inspect`].
#[derive(Default, Debug, Clone)]
pub struct TextLayout;

impl Layout for TextLayout {
    fn format(
        &self,
        event: &Event,
        color: &ColorFn,
        options: &LayoutOptions,
    ) -> Result<String, Error> {
        let time = if options.full_timestamps {
            iso8601(event.time())
        } else {
            clock_time(event.time())
        };

        let level = event.level();
        let level_text = format!("[{}]", level.as_str());
        let level_text = LevelColor::default().colorize(!options.color, level, &level_text);

        let name = format!("[{}]", event.display_name());
        let name = if options.color {
            color.paint(&name)
        } else {
            name
        };

        let padding = if options.uniform_length {
            let level_pad = Level::MAX_NAME_LEN - level.as_str().len();
            let name_len = display_name_len(event.component(), event.source());
            let name_pad = options.max_name_len.saturating_sub(name_len);
            " ".repeat(level_pad + name_pad)
        } else {
            String::new()
        };

        let prefix = format!("[{time}] {level_text} {padding}{name}");

        let body = event
            .messages()
            .iter()
            .map(|value| verbatim(value).unwrap_or_else(|| inspect(value, options.color)))
            .collect::<Vec<_>>()
            .join(" ");

        if body.is_empty() {
            return Ok(prefix);
        }

        let continuation = format!("\n{prefix} ");
        Ok(format!("{prefix} {}", body.replace('\n', &continuation)))
    }
}

/// Top-level strings are written verbatim, also when held by a node.
fn verbatim(value: &Value) -> Option<String> {
    match value {
        Value::Str(s) => Some(s.clone()),
        Value::Ref(node) => node.read().as_str().map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::color::SourceColor;
    use crate::color::resolve;
    use crate::value::Node;
    use crate::values;

    fn time() -> Timestamp {
        "2024-08-11T22:44:57.172Z".parse().unwrap()
    }

    fn render(
        level: Level,
        component: &str,
        source: Option<&str>,
        messages: &[Value],
        options: LayoutOptions,
    ) -> String {
        let event = Event::new(level, time(), component, source, messages);
        TextLayout
            .format(&event, &ColorFn::IDENTITY, &options)
            .unwrap()
    }

    #[test]
    fn test_plain_line() {
        let line = render(
            Level::Info,
            "svc",
            None,
            &values!["x", 1],
            LayoutOptions::default(),
        );
        assert_eq!(line, "[22:44:57.172] [INFO] [svc] x 1");
    }

    #[test]
    fn test_uniform_length_aligns_message_column() {
        let options = LayoutOptions {
            uniform_length: true,
            max_name_len: 4,
            ..Default::default()
        };
        let a = render(Level::Info, "svc", None, &values!["x"], options);
        let b = render(Level::Error, "svc2", None, &values!["y"], options);
        assert_eq!(a, "[22:44:57.172] [INFO]   [svc] x");
        assert_eq!(b, "[22:44:57.172] [ERROR] [svc2] y");
        assert_eq!(a.find(" x"), b.find(" y"));
    }

    #[test]
    fn test_source_joins_display_name() {
        let options = LayoutOptions {
            uniform_length: true,
            max_name_len: 9,
            ..Default::default()
        };
        let line = render(Level::Warn, "db", Some("pool"), &values!["full"], options);
        assert_eq!(line, "[22:44:57.172] [WARN]    [db/pool] full");
    }

    #[test]
    fn test_full_timestamp() {
        let options = LayoutOptions {
            full_timestamps: true,
            ..Default::default()
        };
        let line = render(Level::Debug, "svc", None, &values!["x"], options);
        assert_eq!(line, "[2024-08-11T22:44:57.172Z] [DEBUG] [svc] x");
    }

    #[test]
    fn test_newlines_repeat_prefix() {
        let line = render(
            Level::Info,
            "svc",
            None,
            &values!["first\nsecond", "third"],
            LayoutOptions::default(),
        );
        assert_eq!(
            line,
            "[22:44:57.172] [INFO] [svc] first\n[22:44:57.172] [INFO] [svc] second third"
        );
    }

    #[test]
    fn test_non_string_values_are_inspected() {
        let messages = vec![
            Value::Undefined,
            Value::Object(vec![("k".to_string(), Value::from("v"))]),
        ];
        let line = render(Level::Info, "svc", None, &messages, LayoutOptions::default());
        assert_eq!(line, "[22:44:57.172] [INFO] [svc] undefined { k: 'v' }");
    }

    #[test]
    fn test_shared_string_is_verbatim() {
        let shared = Node::new("hi");
        let messages = vec![Value::from(&shared), Value::from("there")];
        let line = render(Level::Info, "svc", None, &messages, LayoutOptions::default());
        assert_eq!(line, "[22:44:57.172] [INFO] [svc] hi there");
    }

    #[test]
    fn test_empty_messages_have_no_trailing_space() {
        let line = render(Level::Info, "svc", None, &[], LayoutOptions::default());
        assert_eq!(line, "[22:44:57.172] [INFO] [svc]");
    }

    #[test]
    fn test_color_applies_only_when_enabled() {
        let color = resolve(Some(&SourceColor::from("#00ff00"))).unwrap();
        let messages = values!["x"];
        let event = Event::new(Level::Info, time(), "svc", None, &messages);

        let plain = TextLayout
            .format(&event, &color, &LayoutOptions::default())
            .unwrap();
        assert_eq!(plain, "[22:44:57.172] [INFO] [svc] x");

        let options = LayoutOptions {
            color: true,
            ..Default::default()
        };
        let colored = TextLayout.format(&event, &color, &options).unwrap();
        assert_eq!(
            colored,
            "[22:44:57.172] \x1b[32m[INFO]\x1b[0m \x1b[38;2;0;255;0m[svc]\x1b[0m x"
        );
    }

    #[test]
    fn test_output_is_deterministic() {
        let options = LayoutOptions {
            uniform_length: true,
            color: true,
            full_timestamps: true,
            max_name_len: 10,
        };
        let messages = values!["a", 1.5, Value::Null];
        let first = render(Level::Fatal, "svc", Some("x"), &messages, options);
        let second = render(Level::Fatal, "svc", Some("x"), &messages, options);
        assert_eq!(first, second);
    }
}
