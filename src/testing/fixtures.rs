//! Small primitives and components for exercising the tree.

use std::any::Any;

use crate::component::{Component, Construct, Render, RenderCx};
use crate::element::{Element, Primitive};
use crate::props::Props;
use crate::render::canvas::DrawFn;

fn rect(props: &Props) -> Render {
    let w = props.number("w").unwrap_or(0.0);
    let h = props.number("h").unwrap_or(0.0);
    let fill = props.text("fill").unwrap_or("black").to_owned();
    Render::Draw(DrawFn::new(move |canvas| {
        canvas.begin_path();
        canvas.rect(0.0, 0.0, w, h);
        canvas.fill(&fill);
    }))
}

fn group(_props: &Props) -> Render {
    Render::Draw(DrawFn::empty())
}

/// Fills its `w` x `h` box with the `fill` prop (default black).
pub const RECT: Primitive = Primitive::new("rect", rect);

/// Draws nothing; hosts its declared children.
pub const GROUP: Primitive = Primitive::new("group", group);

/// A two-state interactive component. Draws a rect whose fill follows the
/// `on` state value.
#[derive(Debug, Default)]
pub struct Toggle {
    pub props_seen: usize,
}

impl Component for Toggle {
    fn render(&self, cx: &RenderCx<'_>) -> Render {
        let on = cx.state.get("on").and_then(|v| v.as_bool()).unwrap_or(false);
        let fill = if on { "green" } else { "gray" };
        Element::primitive(RECT)
            .with_prop("w", cx.size().width)
            .with_prop("h", cx.size().height)
            .with_prop("fill", fill)
            .into()
    }

    fn receive_props(&mut self, _props: &Props) {
        self.props_seen += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Construct for Toggle {
    fn construct(_props: &Props) -> Self {
        Self::default()
    }

    fn initial_state(props: &Props) -> Props {
        let on = props.get("on").and_then(|v| v.as_bool()).unwrap_or(false);
        Props::new().with("on", on)
    }
}
