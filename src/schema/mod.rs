//! Sample watch face schema
//!
//! A compact specification covering a representative subset of the watch
//! face vocabulary, assembled with the builder DSL exactly the way the full
//! element catalogue is. `Group` is mutually recursive with itself through
//! a constraint thunk; `tintColor` and `BoundingOval` demonstrate
//! version-gated features.

use crate::builder::ConstraintBuilder;
use crate::condition::{
    any_value, attribute, child_element, choice, color_value, integer, non_empty, one_of,
    positive_integer, ValueRule,
};
use crate::constraint::{lazy, Constraint, Occurs};
use crate::validator::Specification;
use crate::version::{Version, VersionSet};
use std::sync::Arc;

/// The specification the CLI validates against.
pub fn watch_face_specification() -> Specification {
    Specification::new(lazy(watch_face), VersionSet::all())
}

fn watch_face() -> Arc<Constraint> {
    ConstraintBuilder::element("WatchFace")
        .require(vec![
            attribute("width", ValueRule::Plain(positive_integer())),
            attribute("height", ValueRule::Plain(positive_integer())),
        ])
        .attribute("clockType", ValueRule::Plain(one_of(&["ANALOG", "DIGITAL"])))
        .child("Metadata", lazy(metadata), Occurs::any())
        .child("Scene", lazy(scene), Occurs::once())
        .build()
}

fn metadata() -> Arc<Constraint> {
    ConstraintBuilder::element("Metadata")
        .require(vec![
            attribute("key", ValueRule::Plain(non_empty())),
            attribute("value", ValueRule::Plain(any_value())),
        ])
        .build()
}

fn scene() -> Arc<Constraint> {
    ConstraintBuilder::element("Scene")
        .attribute("backgroundColor", ValueRule::Plain(color_value()))
        // At least one drawable child kind must be present.
        .require(vec![choice(
            vec![
                child_element("Group", lazy(group), Occurs::any()),
                child_element("PartText", lazy(part_text), Occurs::any()),
                child_element("PartImage", lazy(part_image), Occurs::any()),
            ],
            1,
            3,
        )])
        // Clipping to an oval only exists from revision 4.
        .versions(Version(4).and_above())
        .allow(vec![child_element(
            "BoundingOval",
            lazy(bounding_oval),
            Occurs::between(0, 1),
        )])
        .build()
}

fn group() -> Arc<Constraint> {
    ConstraintBuilder::element("Group")
        .require(vec![
            attribute("x", ValueRule::Plain(integer())),
            attribute("y", ValueRule::Plain(integer())),
            attribute("width", ValueRule::Plain(positive_integer())),
            attribute("height", ValueRule::Plain(positive_integer())),
        ])
        .attribute("angle", ValueRule::Plain(crate::condition::number()))
        .attribute("alpha", ValueRule::Expression)
        // tintColor arrived with revision 2; observing it eliminates v1.
        .attribute("tintColor", ValueRule::Plain(color_value()))
        .versions(Version(2).and_above())
        .allow(vec![attribute("tintColor", ValueRule::Plain(color_value()))])
        .child("Group", lazy(group), Occurs::any())
        .child("PartText", lazy(part_text), Occurs::any())
        .child("PartImage", lazy(part_image), Occurs::any())
        .build()
}

fn part_text() -> Arc<Constraint> {
    ConstraintBuilder::element("PartText")
        .require(vec![
            attribute("x", ValueRule::Plain(integer())),
            attribute("y", ValueRule::Plain(integer())),
            attribute("width", ValueRule::Plain(positive_integer())),
            attribute("height", ValueRule::Plain(positive_integer())),
        ])
        .require(vec![child_element("Text", lazy(text), Occurs::once())])
        .build()
}

fn text() -> Arc<Constraint> {
    ConstraintBuilder::element("Text")
        .attribute("align", ValueRule::Plain(one_of(&["LEFT", "CENTER", "RIGHT"])))
        .content(ValueRule::Expression)
        .build()
}

fn part_image() -> Arc<Constraint> {
    ConstraintBuilder::element("PartImage")
        .require(vec![
            attribute("x", ValueRule::Plain(integer())),
            attribute("y", ValueRule::Plain(integer())),
            attribute("width", ValueRule::Plain(positive_integer())),
            attribute("height", ValueRule::Plain(positive_integer())),
        ])
        .require(vec![child_element("Image", lazy(image), Occurs::once())])
        .build()
}

fn image() -> Arc<Constraint> {
    ConstraintBuilder::element("Image")
        .require(vec![attribute("resource", ValueRule::Plain(non_empty()))])
        .build()
}

fn bounding_oval() -> Arc<Constraint> {
    ConstraintBuilder::element("BoundingOval")
        .require(vec![
            attribute("x", ValueRule::Plain(integer())),
            attribute("y", ValueRule::Plain(integer())),
            attribute("width", ValueRule::Plain(positive_integer())),
            attribute("height", ValueRule::Plain(positive_integer())),
        ])
        .build()
}
