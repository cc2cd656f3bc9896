//! Sparse visual style records.

use serde::{Deserialize, Serialize};

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

/// Text case transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

/// Border line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    Solid,
    Dashed,
    Dotted,
    None,
}

/// How replaced content (images) fills its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    Cover,
    Contain,
    Fill,
    None,
}

macro_rules! style_record {
    ($( $(#[$meta:meta])* $field:ident: $ty:ty ),* $(,)?) => {
        /// Sparse set of CSS-like visual attributes.
        ///
        /// An absent attribute means "use the render default". Updates merge
        /// field by field, so absent attributes never clear existing values.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct Style {
            $(
                $(#[$meta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl Style {
            /// Overwrite every attribute that is present in `partial`.
            pub fn merge(&mut self, partial: &Style) {
                $(
                    if let Some(value) = &partial.$field {
                        self.$field = Some(value.clone());
                    }
                )*
            }

            /// Number of attributes that are set.
            pub fn len(&self) -> usize {
                0 $( + usize::from(self.$field.is_some()) )*
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }
        }
    };
}

style_record! {
    // Background and box
    background_color: String,
    background_gradient: String,
    background_image: String,
    background_size: String,
    background_repeat: String,
    background_position: String,
    background_attachment: String,
    color: String,
    border_radius: String,
    padding: String,
    margin: String,

    // Typography
    font_size: String,
    font_weight: String,
    font_family: String,
    line_height: String,
    letter_spacing: String,
    text_align: TextAlign,
    text_transform: TextTransform,
    text_decoration: String,

    // Borders
    border_width: String,
    border_style: BorderStyle,
    border_color: String,

    // Sizing
    width: String,
    height: String,
    min_width: String,
    min_height: String,

    // Effects
    /// 0.0 (transparent) to 1.0 (opaque).
    opacity: f64,
    box_shadow: String,
    backdrop_filter: String,
    filter: String,
    mix_blend_mode: String,
    object_fit: ObjectFit,

    // Animation
    animation: String,
    transition: String,
    transform: String,
}

impl Style {
    /// Default style of the page root.
    pub fn page_default() -> Self {
        Self {
            background_color: Some("#09090b".to_string()),
            ..Self::default()
        }
    }

    /// Return a copy of `self` with `partial` merged on top.
    pub fn merged(&self, partial: &Style) -> Self {
        let mut style = self.clone();
        style.merge(partial);
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let mut style = Style {
            color: Some("#fff".into()),
            padding: Some("8px".into()),
            ..Default::default()
        };
        let partial = Style {
            color: Some("#000".into()),
            opacity: Some(0.5),
            ..Default::default()
        };

        style.merge(&partial);

        assert_eq!(style.color.as_deref(), Some("#000"));
        assert_eq!(style.padding.as_deref(), Some("8px"));
        assert_eq!(style.opacity, Some(0.5));
        assert_eq!(style.len(), 3);
    }

    #[test]
    fn test_empty_partial_is_noop() {
        let style = Style::page_default();
        assert_eq!(style.merged(&Style::default()), style);
    }

    #[test]
    fn test_camel_case_json() {
        let style = Style {
            background_gradient: Some("linear-gradient(red, blue)".into()),
            text_align: Some(TextAlign::Center),
            object_fit: Some(ObjectFit::Cover),
            ..Default::default()
        };
        let json = serde_json::to_value(&style).unwrap();

        assert_eq!(json["backgroundGradient"], "linear-gradient(red, blue)");
        assert_eq!(json["textAlign"], "center");
        assert_eq!(json["objectFit"], "cover");
        assert_eq!(json.as_object().unwrap().len(), 3);

        let back: Style = serde_json::from_value(json).unwrap();
        assert_eq!(back, style);
    }
}
