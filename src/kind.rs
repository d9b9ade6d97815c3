/// Tag used by link (alias) elements.
pub const LINK_TAG: &str = "include_object";

/// Tag of the document root.
pub const ROOT_TAG: &str = "objectpool";

/// The closed set of object kinds an element tag can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    ObjectPool,
    WorkingSet,
    DataMask,
    AlarmMask,
    SoftKeyMask,
    Key,
    Button,
    Container,
    AuxiliaryFunction,
    AuxiliaryInput,
    InputBoolean,
    InputString,
    InputNumber,
    InputList,
    OutputString,
    OutputNumber,
    Line,
    Rectangle,
    Ellipse,
    Polygon,
    Meter,
    LinearBarGraph,
    ArchedBarGraph,
    PictureGraphic,
    NumberVariable,
    StringVariable,
    FontAttributes,
    LineAttributes,
    FillAttributes,
    InputAttributes,
    ObjectPointer,
    Macro,
    Point,
    Language,
    Unknown,
}

const TAGS: &[(ObjectKind, &str)] = &[
    (ObjectKind::ObjectPool, "objectpool"),
    (ObjectKind::WorkingSet, "workingset"),
    (ObjectKind::DataMask, "datamask"),
    (ObjectKind::AlarmMask, "alarmmask"),
    (ObjectKind::SoftKeyMask, "softkeymask"),
    (ObjectKind::Key, "key"),
    (ObjectKind::Button, "button"),
    (ObjectKind::Container, "container"),
    (ObjectKind::AuxiliaryFunction, "auxiliaryfunction"),
    (ObjectKind::AuxiliaryInput, "auxiliaryinput"),
    (ObjectKind::InputBoolean, "inputboolean"),
    (ObjectKind::InputString, "inputstring"),
    (ObjectKind::InputNumber, "inputnumber"),
    (ObjectKind::InputList, "inputlist"),
    (ObjectKind::OutputString, "outputstring"),
    (ObjectKind::OutputNumber, "outputnumber"),
    (ObjectKind::Line, "line"),
    (ObjectKind::Rectangle, "rectangle"),
    (ObjectKind::Ellipse, "ellipse"),
    (ObjectKind::Polygon, "polygon"),
    (ObjectKind::Meter, "meter"),
    (ObjectKind::LinearBarGraph, "linearbargraph"),
    (ObjectKind::ArchedBarGraph, "archedbargraph"),
    (ObjectKind::PictureGraphic, "picturegraphic"),
    (ObjectKind::NumberVariable, "numbervariable"),
    (ObjectKind::StringVariable, "stringvariable"),
    (ObjectKind::FontAttributes, "fontattributes"),
    (ObjectKind::LineAttributes, "lineattributes"),
    (ObjectKind::FillAttributes, "fillattributes"),
    (ObjectKind::InputAttributes, "inputattributes"),
    (ObjectKind::ObjectPointer, "objectpointer"),
    (ObjectKind::Macro, "macro"),
    (ObjectKind::Point, "point"),
    (ObjectKind::Language, "language"),
];

impl ObjectKind {
    /// Map an element tag to its kind. Unrecognised tags (including the link
    /// tag) map to [`ObjectKind::Unknown`].
    pub fn from_tag(tag: &str) -> Self {
        TAGS.iter()
            .find(|(_, t)| *t == tag)
            .map(|(kind, _)| *kind)
            .unwrap_or(ObjectKind::Unknown)
    }

    pub fn tag(self) -> &'static str {
        TAGS.iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, t)| *t)
            .unwrap_or("unknown")
    }

    /// Human readable plural label used for tree grouping nodes.
    pub fn group_label(self) -> &'static str {
        match self {
            ObjectKind::ObjectPool => "Object Pool",
            ObjectKind::WorkingSet => "Working Sets",
            ObjectKind::DataMask => "Data Masks",
            ObjectKind::AlarmMask => "Alarm Masks",
            ObjectKind::SoftKeyMask => "Soft Key Masks",
            ObjectKind::Key => "Keys",
            ObjectKind::Button => "Buttons",
            ObjectKind::Container => "Containers",
            ObjectKind::AuxiliaryFunction => "Auxiliary Functions",
            ObjectKind::AuxiliaryInput => "Auxiliary Inputs",
            ObjectKind::InputBoolean => "Input Booleans",
            ObjectKind::InputString => "Input Strings",
            ObjectKind::InputNumber => "Input Numbers",
            ObjectKind::InputList => "Input Lists",
            ObjectKind::OutputString => "Output Strings",
            ObjectKind::OutputNumber => "Output Numbers",
            ObjectKind::Line => "Lines",
            ObjectKind::Rectangle => "Rectangles",
            ObjectKind::Ellipse => "Ellipses",
            ObjectKind::Polygon => "Polygons",
            ObjectKind::Meter => "Meters",
            ObjectKind::LinearBarGraph => "Linear Bar Graphs",
            ObjectKind::ArchedBarGraph => "Arched Bar Graphs",
            ObjectKind::PictureGraphic => "Picture Graphics",
            ObjectKind::NumberVariable => "Number Variables",
            ObjectKind::StringVariable => "String Variables",
            ObjectKind::FontAttributes => "Font Attributes",
            ObjectKind::LineAttributes => "Line Attributes",
            ObjectKind::FillAttributes => "Fill Attributes",
            ObjectKind::InputAttributes => "Input Attributes",
            ObjectKind::ObjectPointer => "Object Pointers",
            ObjectKind::Macro => "Macros",
            ObjectKind::Point => "Points",
            ObjectKind::Language => "Languages",
            ObjectKind::Unknown => "Unknown",
        }
    }

    /// The four full-screen root types. The grid overlay is never captured
    /// when one of these is the active leaf.
    pub fn is_mask_like(self) -> bool {
        matches!(
            self,
            ObjectKind::WorkingSet
                | ObjectKind::DataMask
                | ObjectKind::AlarmMask
                | ObjectKind::SoftKeyMask
        )
    }

    pub fn is_mask(self) -> bool {
        matches!(self, ObjectKind::DataMask | ObjectKind::AlarmMask)
    }

    /// Children of these kinds are never traversed.
    pub fn is_skipped_child(self) -> bool {
        matches!(self, ObjectKind::Macro | ObjectKind::Language)
    }

    /// Kinds that have a visual representation and a visitor operation.
    pub fn is_drawable(self) -> bool {
        !matches!(
            self,
            ObjectKind::ObjectPool
                | ObjectKind::NumberVariable
                | ObjectKind::StringVariable
                | ObjectKind::FontAttributes
                | ObjectKind::LineAttributes
                | ObjectKind::FillAttributes
                | ObjectKind::InputAttributes
                | ObjectKind::Macro
                | ObjectKind::Point
                | ObjectKind::Language
                | ObjectKind::Unknown
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip_for_every_known_kind() {
        for (kind, tag) in TAGS {
            assert_eq!(ObjectKind::from_tag(tag), *kind);
            assert_eq!(kind.tag(), *tag);
        }
    }

    #[test]
    fn test_link_tag_is_not_a_kind() {
        assert_eq!(ObjectKind::from_tag(LINK_TAG), ObjectKind::Unknown);
        assert_eq!(ObjectKind::from_tag("frobnicator"), ObjectKind::Unknown);
    }

    #[test]
    fn test_mask_like_kinds() {
        assert!(ObjectKind::WorkingSet.is_mask_like());
        assert!(ObjectKind::SoftKeyMask.is_mask_like());
        assert!(!ObjectKind::Container.is_mask_like());
        assert!(!ObjectKind::Key.is_mask_like());
    }

    #[test]
    fn test_non_visual_kinds_are_not_drawable() {
        assert!(!ObjectKind::FontAttributes.is_drawable());
        assert!(!ObjectKind::Point.is_drawable());
        assert!(ObjectKind::Meter.is_drawable());
        assert!(ObjectKind::ObjectPointer.is_drawable());
    }
}
