//! The drawing surface collaborator.

use nalgebra::Point2;

use crate::{Color, LineStyle, MarkerStyle};

/// Receives primitive drawing commands in screen coordinates, in paint order.
///
/// Widths and marker sizes arrive already multiplied by the scene's line
/// scale. Coordinates are always finite.
pub trait DrawSurface {
    /// Fills a closed polygon and optionally strokes its outline.
    fn fill_path(&mut self, points: &[Point2<f64>], fill: Option<Color>, edge: Option<LineStyle>);

    /// Strokes a straight line.
    fn stroke_line(&mut self, from: Point2<f64>, to: Point2<f64>, line: LineStyle);

    /// Draws a point marker centred on `at`.
    fn draw_marker(&mut self, at: Point2<f64>, marker: MarkerStyle);
}

/// One recorded drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillPath {
        points: Vec<Point2<f64>>,
        fill: Option<Color>,
        edge: Option<LineStyle>,
    },
    StrokeLine {
        from: Point2<f64>,
        to: Point2<f64>,
        line: LineStyle,
    },
    Marker {
        at: Point2<f64>,
        marker: MarkerStyle,
    },
}

/// A surface that records commands instead of drawing them.
#[derive(Debug, Default, Clone)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded commands.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Consumes the recorder and returns its commands.
    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl DrawSurface for CommandRecorder {
    fn fill_path(&mut self, points: &[Point2<f64>], fill: Option<Color>, edge: Option<LineStyle>) {
        self.commands.push(DrawCommand::FillPath {
            points: points.to_vec(),
            fill,
            edge,
        });
    }

    fn stroke_line(&mut self, from: Point2<f64>, to: Point2<f64>, line: LineStyle) {
        self.commands.push(DrawCommand::StrokeLine { from, to, line });
    }

    fn draw_marker(&mut self, at: Point2<f64>, marker: MarkerStyle) {
        self.commands.push(DrawCommand::Marker { at, marker });
    }
}
