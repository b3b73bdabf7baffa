//! SVG writer for rendered charts
//!
//! Serializes a `RenderedChart` into a standalone SVG document.

use crate::error::{ChartError, ChartResult};
use crate::render::*;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Writer for SVG chart documents
pub struct SvgWriter {
    /// Decimal places kept for coordinates
    precision: usize,
}

impl Default for SvgWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgWriter {
    pub fn new() -> Self {
        Self { precision: 3 }
    }

    /// Set the number of decimal places written for coordinates
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Write a rendered chart to an SVG string
    pub fn write(&self, chart: &RenderedChart) -> ChartResult<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        let width = self.number(chart.width);
        let height = self.number(chart.height);
        let view_box = format!("0 0 {} {}", width, height);

        let mut root = BytesStart::new("svg");
        root.push_attribute(("xmlns", SVG_NAMESPACE));
        root.push_attribute(("width", width.as_str()));
        root.push_attribute(("height", height.as_str()));
        root.push_attribute(("viewBox", view_box.as_str()));
        write_event(&mut writer, Event::Start(root))?;

        if let Some(background) = chart.background {
            let fill = background.to_css();
            self.write_empty(
                &mut writer,
                "rect",
                &[
                    ("x", "0".to_string()),
                    ("y", "0".to_string()),
                    ("width", width.clone()),
                    ("height", height.clone()),
                    ("fill", fill),
                ],
            )?;
        }

        let transform = format!(
            "translate({}, {})",
            self.number(chart.offset.x),
            self.number(chart.offset.y)
        );
        let mut group = BytesStart::new("g");
        group.push_attribute(("transform", transform.as_str()));
        write_event(&mut writer, Event::Start(group))?;

        for primitive in &chart.primitives {
            self.write_primitive(&mut writer, primitive)?;
        }

        write_event(&mut writer, Event::End(BytesEnd::new("g")))?;
        write_event(&mut writer, Event::End(BytesEnd::new("svg")))?;

        let result = writer.into_inner().into_inner();
        String::from_utf8(result).map_err(|e| ChartError::Serialization(e.to_string()))
    }

    fn write_primitive<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        primitive: &ChartRenderPrimitive,
    ) -> ChartResult<()> {
        match primitive {
            ChartRenderPrimitive::Rect {
                x,
                y,
                width,
                height,
                fill,
            } => self.write_empty(
                writer,
                "rect",
                &[
                    ("x", self.number(*x)),
                    ("y", self.number(*y)),
                    ("width", self.number(*width)),
                    ("height", self.number(*height)),
                    ("fill", fill.clone()),
                ],
            ),
            ChartRenderPrimitive::Circle {
                cx,
                cy,
                r,
                fill,
                stroke,
                stroke_width,
            } => {
                let mut attributes = vec![
                    ("cx", self.number(*cx)),
                    ("cy", self.number(*cy)),
                    ("r", self.number(*r)),
                    ("fill", fill.clone()),
                ];
                if let Some(stroke) = stroke {
                    attributes.push(("stroke", stroke.clone()));
                }
                if let Some(width) = stroke_width {
                    attributes.push(("stroke-width", self.number(*width)));
                }
                self.write_empty(writer, "circle", &attributes)
            }
            ChartRenderPrimitive::Line {
                x1,
                y1,
                x2,
                y2,
                stroke,
                stroke_width,
            } => self.write_empty(
                writer,
                "line",
                &[
                    ("x1", self.number(*x1)),
                    ("y1", self.number(*y1)),
                    ("x2", self.number(*x2)),
                    ("y2", self.number(*y2)),
                    ("stroke", stroke.clone()),
                    ("stroke-width", self.number(*stroke_width)),
                ],
            ),
            ChartRenderPrimitive::Text {
                x,
                y,
                text,
                font_size,
                font_family,
                fill,
                anchor,
                baseline,
                rotation,
            } => {
                let x = self.number(*x);
                let y = self.number(*y);
                let mut element = BytesStart::new("text");
                element.push_attribute(("x", x.as_str()));
                element.push_attribute(("y", y.as_str()));
                element.push_attribute(("font-size", self.number(*font_size).as_str()));
                element.push_attribute(("font-family", font_family.as_str()));
                element.push_attribute(("fill", fill.as_str()));
                element.push_attribute(("text-anchor", anchor.as_str()));
                if let Some(baseline) = baseline.as_attribute() {
                    element.push_attribute(("dominant-baseline", baseline));
                }
                if let Some(angle) = rotation {
                    let transform = format!("rotate({}, {}, {})", self.number(*angle), x, y);
                    element.push_attribute(("transform", transform.as_str()));
                }

                write_event(writer, Event::Start(element))?;
                write_event(writer, Event::Text(BytesText::new(text)))?;
                write_event(writer, Event::End(BytesEnd::new("text")))
            }
        }
    }

    fn write_empty<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        name: &str,
        attributes: &[(&str, String)],
    ) -> ChartResult<()> {
        let mut element = BytesStart::new(name);
        for (key, value) in attributes {
            element.push_attribute((*key, value.as_str()));
        }
        write_event(writer, Event::Empty(element))
    }

    /// Format a coordinate without trailing zeros
    fn number(&self, value: f64) -> String {
        let formatted = format!("{:.*}", self.precision, value);
        let trimmed = if formatted.contains('.') {
            formatted.trim_end_matches('0').trim_end_matches('.')
        } else {
            formatted.as_str()
        };
        if trimmed == "-0" {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

fn write_event<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> ChartResult<()> {
    writer
        .write_event(event)
        .map_err(|e| ChartError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutPoint;
    use crate::model::Color;

    fn chart(primitives: Vec<ChartRenderPrimitive>) -> RenderedChart {
        RenderedChart {
            width: 120.0,
            height: 80.0,
            offset: LayoutPoint::new(10.0, 5.5),
            extents: Extents {
                left: 0.0,
                top: 0.0,
                right: 100.0,
                bottom: 70.0,
            },
            background: None,
            primitives,
        }
    }

    #[test]
    fn test_document_root() {
        let svg = SvgWriter::new().write(&chart(Vec::new())).unwrap();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("width=\"120\""));
        assert!(svg.contains("height=\"80\""));
        assert!(svg.contains("viewBox=\"0 0 120 80\""));
        assert!(svg.contains("<g transform=\"translate(10, 5.5)\">"));
        assert!(svg.ends_with("</g></svg>"));
    }

    #[test]
    fn test_background_precedes_content() {
        let mut rendered = chart(vec![rect(0.0, 0.0, 1.0, 1.0, Color::BLACK)]);
        rendered.background = Some(Color::rgb(0x11, 0x22, 0x33));
        let svg = SvgWriter::new().write(&rendered).unwrap();

        let background = svg.find("fill=\"#112233\"").unwrap();
        let group = svg.find("<g ").unwrap();
        assert!(background < group);
        assert!(svg.contains("<rect x=\"0\" y=\"0\" width=\"120\" height=\"80\" fill=\"#112233\"/>"));
    }

    #[test]
    fn test_shapes() {
        let svg = SvgWriter::new()
            .write(&chart(vec![
                rect(1.0, 2.0, 3.0, 4.25, Color::BLACK),
                circle(5.0, 6.0, 5.0, Color::WHITE, Some((Color::BLACK, 1.5))),
                line(0.0, 0.0, 0.0, 100.0, Color::BLACK, 1.0),
            ]))
            .unwrap();

        assert!(svg.contains("<rect x=\"1\" y=\"2\" width=\"3\" height=\"4.25\" fill=\"#000000\"/>"));
        assert!(svg.contains(
            "<circle cx=\"5\" cy=\"6\" r=\"5\" fill=\"#ffffff\" stroke=\"#000000\" stroke-width=\"1.5\"/>"
        ));
        assert!(svg.contains(
            "<line x1=\"0\" y1=\"0\" x2=\"0\" y2=\"100\" stroke=\"#000000\" stroke-width=\"1\"/>"
        ));
    }

    #[test]
    fn test_rotated_text() {
        let style = TextStyle::new(10.0, "sans-serif", Color::BLACK)
            .anchor(TextAnchor::End)
            .rotated(-90.0);
        let svg = SvgWriter::new()
            .write(&chart(vec![text("Q1", 25.0, 205.0, &style)]))
            .unwrap();

        assert!(svg.contains("text-anchor=\"end\""));
        assert!(svg.contains("transform=\"rotate(-90, 25, 205)\""));
        assert!(svg.contains(">Q1</text>"));
        assert!(!svg.contains("dominant-baseline"));
    }

    #[test]
    fn test_text_is_escaped() {
        let style = TextStyle::new(10.0, "sans-serif", Color::BLACK)
            .baseline(TextBaseline::Middle);
        let svg = SvgWriter::new()
            .write(&chart(vec![text("R&D <2024>", 0.0, 0.0, &style)]))
            .unwrap();

        assert!(svg.contains("R&amp;D &lt;2024&gt;"));
        assert!(svg.contains("dominant-baseline=\"middle\""));
    }

    #[test]
    fn test_number_formatting() {
        let writer = SvgWriter::new();
        assert_eq!(writer.number(35.0), "35");
        assert_eq!(writer.number(66.666666), "66.667");
        assert_eq!(writer.number(-0.0001), "0");
        assert_eq!(writer.number(-12.5), "-12.5");
        assert_eq!(SvgWriter::new().precision(0).number(12.6), "13");
    }
}
