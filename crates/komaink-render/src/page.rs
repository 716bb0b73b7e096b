//! Drawing a whole page through an adapter.

use crate::adapter::{DrawStyle, RenderAdapter, RenderResult};
use crate::svg::SvgAdapter;
use komaink_core::document::PageDocument;
use komaink_core::elements::Element;
use komaink_core::manipulation::Handle;
use peniko::Color;

/// Page output options.
#[derive(Debug, Clone, Copy)]
pub struct PageRenderOptions {
    pub background: Option<Color>,
    /// Draw the dashed frame around free text.
    pub show_text_frames: bool,
}

impl Default for PageRenderOptions {
    fn default() -> Self {
        Self {
            background: Some(Color::WHITE),
            show_text_frames: false,
        }
    }
}

fn has_paint(style: &DrawStyle) -> bool {
    style.fill.is_some() || style.stroke.is_some()
}

/// Draw every element back to front, then `handles` on top.
pub fn render_page<A: RenderAdapter>(
    adapter: &mut A,
    document: &PageDocument,
    handles: &[Handle],
    options: &PageRenderOptions,
) -> RenderResult<()> {
    let elements = document.elements_by_z();
    for element in &elements {
        let style = DrawStyle::from(*element);
        match element {
            Element::Panel(_) => adapter.draw_shape(&element.to_path(), &style)?,
            Element::Dialogue(bubble) => {
                adapter.draw_shape(&element.to_path(), &style)?;
                if !bubble.text.is_empty() {
                    adapter.draw_label(bubble.transform.rect(), &bubble.text, bubble.font_size)?;
                }
            }
            Element::Text(text) => {
                if options.show_text_frames {
                    adapter.draw_shape(&element.to_path(), &style)?;
                }
                adapter.draw_label(text.transform.rect(), &text.content, text.font_size)?;
            }
            Element::Image(image) => {
                let clip = image
                    .parent_panel
                    .and_then(|id| document.get(id))
                    .map(Element::to_path);
                adapter.draw_image(&image.transform, &image.source, clip.as_ref())?;
                if has_paint(&style) {
                    adapter.draw_shape(&element.to_path(), &style)?;
                }
            }
            Element::Sprite(sprite) => {
                adapter.draw_image(&sprite.transform, &sprite.asset, None)?;
            }
        }
    }
    adapter.place_handles(handles)?;
    log::debug!("Rendered {} elements and {} handles", elements.len(), handles.len());
    Ok(())
}

/// Render a page to an SVG string sized to the page.
pub fn render_svg(
    document: &PageDocument,
    handles: &[Handle],
    options: &PageRenderOptions,
) -> RenderResult<String> {
    let mut adapter = SvgAdapter::new(document.page_size);
    if let Some(bg) = options.background {
        adapter = adapter.with_background(bg);
    }
    render_page(&mut adapter, document, handles, options)?;
    adapter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use komaink_core::elements::{Bubble, BubbleKind, Image, Panel, TextBox, Transform};
    use komaink_core::manipulation::handles_for;
    use komaink_core::TailConfig;
    use kurbo::{BezPath, Rect};

    /// Records calls for assertions.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl RenderAdapter for Recorder {
        fn draw_shape(&mut self, path: &BezPath, _style: &DrawStyle) -> RenderResult<()> {
            let subpaths = path
                .elements()
                .iter()
                .filter(|el| matches!(el, kurbo::PathEl::MoveTo(_)))
                .count();
            self.calls.push(format!("shape:{subpaths}"));
            Ok(())
        }

        fn place_handles(&mut self, handles: &[Handle]) -> RenderResult<()> {
            self.calls.push(format!("handles:{}", handles.len()));
            Ok(())
        }

        fn draw_label(&mut self, _frame: Rect, text: &str, _font_size: f64) -> RenderResult<()> {
            self.calls.push(format!("label:{text}"));
            Ok(())
        }

        fn draw_image(
            &mut self,
            _transform: &Transform,
            source: &str,
            clip: Option<&BezPath>,
        ) -> RenderResult<()> {
            self.calls.push(format!("image:{source}:{}", clip.is_some()));
            Ok(())
        }
    }

    fn with_z(mut el: Element, z: i32) -> Element {
        el.transform_mut().z_index = z;
        el
    }

    #[test]
    fn test_draw_order_and_calls() {
        let mut doc = PageDocument::default();
        let panel = with_z(Element::Panel(Panel::new(Rect::new(0.0, 0.0, 400.0, 300.0))), 110);
        let image = with_z(
            Element::Image(Image::new(Rect::new(10.0, 10.0, 390.0, 290.0), "p.png").in_panel(panel.id())),
            410,
        );
        let bubble = with_z(
            Element::Dialogue(
                Bubble::new(Rect::new(20.0, 20.0, 170.0, 100.0), BubbleKind::Speech)
                    .with_tail(Some(TailConfig::new(90.0, 30.0)))
                    .with_text("Hi"),
            ),
            1010,
        );
        // Insert out of z order.
        doc.add(bubble.clone());
        doc.add(image);
        doc.add(panel);

        let handles = handles_for(&bubble);
        let mut rec = Recorder::default();
        render_page(&mut rec, &doc, &handles, &PageRenderOptions::default()).unwrap();
        assert_eq!(
            rec.calls,
            vec![
                "shape:1".to_string(),
                "image:p.png:true".to_string(),
                "shape:2".to_string(),
                "label:Hi".to_string(),
                "handles:10".to_string(),
            ]
        );
    }

    #[test]
    fn test_text_frame_option() {
        let mut doc = PageDocument::default();
        doc.add(Element::Text(TextBox::new(Rect::new(0.0, 0.0, 200.0, 50.0), "BAM")));
        let mut rec = Recorder::default();
        render_page(&mut rec, &doc, &[], &PageRenderOptions::default()).unwrap();
        assert_eq!(rec.calls, vec!["label:BAM".to_string(), "handles:0".to_string()]);

        let mut rec = Recorder::default();
        let options = PageRenderOptions {
            show_text_frames: true,
            ..PageRenderOptions::default()
        };
        render_page(&mut rec, &doc, &[], &options).unwrap();
        assert_eq!(rec.calls[0], "shape:1");
    }

    #[test]
    fn test_render_svg() {
        let mut doc = PageDocument::default();
        doc.add(Element::Dialogue(
            Bubble::new(Rect::new(100.0, 100.0, 250.0, 180.0), BubbleKind::Shout).with_text("NO!"),
        ));
        let svg = render_svg(&doc, &[], &PageRenderOptions::default()).unwrap();
        assert!(svg.contains(r#"width="800" height="1200""#));
        assert!(svg.contains("<path d=\"M"));
        assert!(svg.contains("NO!"));
        assert!(svg.contains(r##"fill="#ffffff""##));
    }
}
