//! Tabular backend.
//!
//! [`Frame`] holds named columns of [`Vector`](crate::backends::vector::Vector)s;
//! [`GroupedFrame`] adds grouping metadata. Grouped frames list `frame` in
//! their ancestry, so this one plugin serves both.

mod grouped;
mod table;
mod verbs;

pub use grouped::{Group, GroupedFrame, GROUPED_FRAME};
pub use table::{Frame, FRAME, TABLE};

use crate::dispatch::VerbArgs;
use crate::error::Result;
use crate::eval::ContextKind;
use crate::registry::{PluginDescriptor, PluginFactory, VerbImpl, PLUGINS};
use crate::value::Value;
use linkme::distributed_slice;
use verbs::JoinKind;

/// Plugin name.
pub const PLUGIN_NAME: &str = "frame";

fn selecting(f: fn(VerbArgs) -> Result<Value>) -> VerbImpl {
    VerbImpl::new(f).with_context(ContextKind::Select)
}

/// Descriptor for the frame backend.
pub fn descriptor() -> PluginDescriptor {
    PluginDescriptor::new(PLUGIN_NAME)
        .owns(FRAME)
        .verb_impl("select", selecting(verbs::select))
        .verb("filter", verbs::filter)
        .verb("mutate", verbs::mutate)
        .verb_impl("rename", selecting(verbs::rename))
        .verb("arrange", verbs::arrange)
        .verb_impl("group_by", selecting(verbs::group_by))
        .verb("ungroup", verbs::ungroup)
        .verb("summarise", verbs::summarise)
        .verb_impl("pull", selecting(verbs::pull))
        .verb_impl(
            "inner_join",
            VerbImpl::new(|args| verbs::join(args, JoinKind::Inner))
                .with_extra_context("by", ContextKind::Select),
        )
        .verb_impl(
            "left_join",
            VerbImpl::new(|args| verbs::join(args, JoinKind::Left))
                .with_extra_context("by", ContextKind::Select),
        )
        .verb_impl("count", selecting(verbs::count))
        .verb("n", verbs::n)
        .verb("sum", verbs::aggregate)
        .verb("mean", verbs::aggregate)
        .verb("min", verbs::aggregate)
        .verb("max", verbs::aggregate)
        .verb("starts_with", |args| {
            verbs::match_names(args, |name, p| name.starts_with(p))
        })
        .verb("ends_with", |args| {
            verbs::match_names(args, |name, p| name.ends_with(p))
        })
        .verb("contains", |args| {
            verbs::match_names(args, |name, p| name.contains(p))
        })
}

#[distributed_slice(PLUGINS)]
static FRAME_PLUGIN: PluginFactory = descriptor;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::vector::{self, Vector};
    use crate::dispatch::{Arg, Dispatcher};
    use crate::error::PlyrError;
    use crate::expr::{col, Expr};
    use crate::registry::Registry;
    use crate::verbs;
    use indexmap::IndexMap;
    use std::sync::Arc;

    fn dispatcher() -> Dispatcher {
        let registry = Registry::new();
        registry.register(vector::descriptor()).unwrap();
        registry.register(descriptor()).unwrap();
        Dispatcher::new(Arc::new(registry))
    }

    fn people() -> Value {
        Frame::from_columns([
            ("name", Vector::from(vec!["ann", "bob", "cat", "dan"])),
            ("team", Vector::from(vec!["red", "blue", "red", "blue"])),
            ("score", Vector::from(vec![3i64, 5, 4, 1])),
        ])
        .unwrap()
        .into_value()
    }

    fn kw(pairs: Vec<(&str, Arg)>) -> IndexMap<String, Arg> {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn column(value: &Value, name: &str) -> Vector {
        let frame = value
            .downcast_ref::<Frame>()
            .or_else(|| value.downcast_ref::<GroupedFrame>().map(GroupedFrame::frame))
            .unwrap();
        frame.column(name).unwrap().clone()
    }

    #[test]
    fn test_select_uses_names_and_helpers() {
        let d = dispatcher();
        let out = d
            .call(
                "select",
                vec![people().into(), col("score").into(), verbs::starts_with("na").into()],
            )
            .unwrap();
        let frame = out.downcast_ref::<Frame>().unwrap();
        assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["score", "name"]);
    }

    #[test]
    fn test_name_helpers_ignore_case_and_take_pattern_lists() {
        let d = dispatcher();
        let names = |helper: Expr| {
            let out = d.call("select", vec![people().into(), helper.into()]).unwrap();
            let frame = out.downcast_ref::<Frame>().unwrap();
            frame.column_names().map(str::to_string).collect::<Vec<_>>()
        };

        assert_eq!(names(verbs::starts_with("NA")), vec!["name"]);
        assert_eq!(names(verbs::ends_with("RE")), vec!["score"]);
        assert!(names(verbs::name_match(verbs::Verb::StartsWith, &["NA"], false)).is_empty());
        assert_eq!(
            names(verbs::name_match(verbs::Verb::StartsWith, &["sc", "na"], true)),
            vec!["name", "score"]
        );
        assert_eq!(
            names(verbs::name_match(verbs::Verb::Contains, &["e", "a"], false)),
            vec!["name", "team", "score"]
        );
    }

    #[test]
    fn test_name_helper_matches_against_vars() {
        let d = dispatcher();
        let vars = Value::List(vec!["max".into(), "min".into(), "xs".into()]);
        let out = d
            .dispatch(
                "contains",
                vec![people().into(), "X".into()],
                kw(vec![("vars", vars.into())]),
            )
            .unwrap();
        assert_eq!(out, Value::List(vec!["max".into(), "xs".into()]));
    }

    #[test]
    fn test_filter_with_aggregate_per_group() {
        let d = dispatcher();
        let grouped = d.call("group_by", vec![people().into(), col("team").into()]).unwrap();
        // rows scoring at least their team's mean
        let out = d
            .call(
                "filter",
                vec![grouped.into(), col("score").ge(verbs::mean(col("score"))).into()],
            )
            .unwrap();
        assert!(out.downcast_ref::<GroupedFrame>().is_some());
        assert_eq!(column(&out, "name"), Vector::from(vec!["bob", "cat"]));
    }

    #[test]
    fn test_summarise_grouped_keeps_group_order() {
        let d = dispatcher();
        let grouped = d.call("group_by", vec![people().into(), col("team").into()]).unwrap();
        let out = d
            .dispatch(
                "summarise",
                vec![grouped.into()],
                kw(vec![
                    ("total", verbs::sum(col("score")).into()),
                    ("rows", verbs::n().into()),
                ]),
            )
            .unwrap();
        assert_eq!(column(&out, "team"), Vector::from(vec!["red", "blue"]));
        assert_eq!(column(&out, "total"), Vector::from(vec![7i64, 6]));
        assert_eq!(column(&out, "rows"), Vector::from(vec![2i64, 2]));
        assert!(out.downcast_ref::<Frame>().is_some());
    }

    #[test]
    fn test_rename_arrange_pull() {
        let d = dispatcher();
        let renamed = d
            .dispatch("rename", vec![people().into()], kw(vec![("points", col("score").into())]))
            .unwrap();
        let sorted = d
            .dispatch(
                "arrange",
                vec![renamed.into(), col("points").into()],
                kw(vec![("descending", true.into())]),
            )
            .unwrap();
        let names = d.call("pull", vec![sorted.into(), col("name").into()]).unwrap();
        assert_eq!(
            names,
            Vector::from(vec!["bob", "cat", "ann", "dan"]).into_value()
        );
    }

    #[test]
    fn test_joins() {
        let d = dispatcher();
        let teams = Frame::from_columns([
            ("team", Vector::from(vec!["red", "green"])),
            ("coach", Vector::from(vec!["eve", "fay"])),
        ])
        .unwrap()
        .into_value();

        let inner = d
            .dispatch(
                "inner_join",
                vec![people().into(), teams.clone().into()],
                kw(vec![("by", col("team").into())]),
            )
            .unwrap();
        assert_eq!(column(&inner, "name"), Vector::from(vec!["ann", "cat"]));
        assert_eq!(column(&inner, "coach"), Vector::from(vec!["eve", "eve"]));

        let left = d
            .dispatch("left_join", vec![people().into(), teams.into()], IndexMap::new())
            .unwrap();
        assert_eq!(
            column(&left, "coach"),
            Vector::new(vec![
                Value::from("eve"),
                Value::Null,
                Value::from("eve"),
                Value::Null,
            ])
        );
    }

    #[test]
    fn test_join_suffixes_never_overwrite() {
        let d = dispatcher();
        let bonus = Frame::from_columns([
            ("team", Vector::from(vec!["red", "blue"])),
            ("score", Vector::from(vec![10i64, 20])),
            ("score_y", Vector::from(vec![100i64, 200])),
        ])
        .unwrap()
        .into_value();

        let joined = d
            .dispatch(
                "inner_join",
                vec![people().into(), bonus.clone().into()],
                kw(vec![("by", col("team").into())]),
            )
            .unwrap();
        let frame = joined.downcast_ref::<Frame>().unwrap();
        assert_eq!(
            frame.column_names().collect::<Vec<_>>(),
            vec!["name", "team", "score_x", "score_y_y", "score_y"]
        );
        assert_eq!(column(&joined, "score_x"), Vector::from(vec![3i64, 5, 4, 1]));
        assert_eq!(column(&joined, "score_y_y"), Vector::from(vec![10i64, 20, 10, 20]));
        assert_eq!(column(&joined, "score_y"), Vector::from(vec![100i64, 200, 100, 200]));

        let custom = d
            .dispatch(
                "left_join",
                vec![people().into(), bonus.clone().into()],
                kw(vec![
                    ("by", col("team").into()),
                    ("suffix", Value::List(vec!["_me".into(), "_them".into()]).into()),
                ]),
            )
            .unwrap();
        let frame = custom.downcast_ref::<Frame>().unwrap();
        assert_eq!(
            frame.column_names().collect::<Vec<_>>(),
            vec!["name", "team", "score_me", "score_them", "score_y"]
        );

        let err = d
            .dispatch(
                "inner_join",
                vec![people().into(), bonus.into()],
                kw(vec![
                    ("by", col("team").into()),
                    ("suffix", Value::List(vec!["_a".into()]).into()),
                ]),
            )
            .unwrap_err();
        assert!(matches!(err, PlyrError::Backend(_)));
    }

    #[test]
    fn test_join_keys_checked_against_empty_right() {
        let d = dispatcher();
        let no_teams = Frame::from_columns([
            ("team", Vector::new(Vec::new())),
            ("coach", Vector::new(Vec::new())),
        ])
        .unwrap()
        .into_value();

        let err = d
            .dispatch(
                "left_join",
                vec![people().into(), no_teams.clone().into()],
                kw(vec![("by", "tem".into())]),
            )
            .unwrap_err();
        assert!(matches!(err, PlyrError::KeyNotFound { .. }));

        let inner = d
            .dispatch(
                "inner_join",
                vec![people().into(), no_teams.into()],
                kw(vec![("by", "team".into())]),
            )
            .unwrap();
        let frame = inner.downcast_ref::<Frame>().unwrap();
        assert_eq!(frame.nrows(), 0);
        assert_eq!(
            frame.column_names().collect::<Vec<_>>(),
            vec!["name", "team", "score", "coach"]
        );
    }

    #[test]
    fn test_count_and_n() {
        let d = dispatcher();
        let counted = d.call("count", vec![people().into(), col("team").into()]).unwrap();
        assert_eq!(column(&counted, "n"), Vector::from(vec![2i64, 2]));
        assert_eq!(d.call("n", vec![people().into()]).unwrap(), Value::Int(4));
    }

    #[test]
    fn test_mutate_drops_null_columns_and_regroups() {
        let d = dispatcher();
        let grouped = d.call("group_by", vec![people().into(), col("team").into()]).unwrap();
        let out = d
            .dispatch(
                "mutate",
                vec![grouped.into()],
                kw(vec![
                    ("team", Arg::Value(Value::Null)),
                    ("double", col("score").mul(2).into()),
                ]),
            )
            .unwrap();
        let frame = out.downcast_ref::<Frame>().unwrap();
        assert!(!frame.has_column("team"));
        assert_eq!(frame.column("double").unwrap(), &Vector::from(vec![6i64, 10, 8, 2]));
    }

    #[test]
    fn test_unknown_column_surfaces() {
        let d = dispatcher();
        let err = d
            .call("filter", vec![people().into(), col("nope").gt(1).into()])
            .unwrap_err();
        assert!(matches!(err, crate::error::PlyrError::AttributeNotFound { .. }));

        let err = d
            .call("select", vec![people().into(), Expr::lit("nope").into()])
            .unwrap_err();
        assert!(matches!(err, crate::error::PlyrError::KeyNotFound { .. }));
    }
}
