//! Axis labels around the board area.
//!
//! Layout is computed by [layout_labels] from text metrics only, drawing is
//! a separate step so the geometry can be checked without rasterizing.

use pixelboard_common::{PixelColor, colors};

use crate::canvas::Canvas;
use crate::canvas::alpha;
use crate::canvas::text::{TextMeasure, TextRaster};
use crate::render::coords::GridTransform;

/// Distance between the board area and the labels, in image pixels.
pub const LABEL_GAP: i64 = 10;

/// Every n-th coordinate line gets a tick label.
pub const TICK_STEP: i64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn color(self) -> PixelColor {
        match self {
            Axis::X => colors::BLUE,
            Axis::Y => colors::RED,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelKind {
    /// Numeric coordinate of a grid line
    Tick,
    /// `-X`, `+X`, `-Y` and `+Y` markers
    End,
}

/// A positioned label: `x` is the left edge, `baseline` the text baseline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    pub text: String,
    pub x: i64,
    pub baseline: i64,
    pub axis: Axis,
    pub kind: LabelKind,
}

impl Label {
    pub fn opacity(&self) -> u8 {
        match self.kind {
            LabelKind::Tick => alpha(0.4),
            LabelKind::End => alpha(0.6),
        }
    }
}

/// Text of the tick label for coordinate `n`.
pub fn tick_text(n: i64) -> String {
    if n > 0 { format!("+{n}") } else { n.to_string() }
}

fn is_tick(n: i64) -> bool {
    n != 0 && n % TICK_STEP == 0
}

/// Baseline that vertically centers a text box of the given metrics on `center`.
fn centered_baseline(center: f64, ascent: u32, descent: u32) -> i64 {
    (center + (ascent as f64 - descent as f64) / 2.0).round() as i64
}

/// Compute every axis label around the transform's drawing area.
///
/// - X ticks sit below the area, centered on their column.
/// - Y ticks sit left of the area, right-aligned, centered on their row.
/// - `-X`/`+X` sit left/right of the area on the X axis row.
/// - `+Y`/`-Y` sit above/below the area on the Y axis column.
pub fn layout_labels<M: TextMeasure + ?Sized>(
    transform: &GridTransform,
    measure: &M,
) -> Vec<Label> {
    let range = transform.range();
    let area = transform.area();
    let mut labels = Vec::new();

    for x in (range.min_x..range.max_x).filter(|x| is_tick(*x)) {
        let text = tick_text(x);
        let metrics = measure.measure(&text);
        labels.push(Label {
            x: (transform.column_center(x) - metrics.width as f64 / 2.0).round() as i64,
            baseline: area.bottom() + LABEL_GAP + metrics.ascent as i64,
            text,
            axis: Axis::X,
            kind: LabelKind::Tick,
        });
    }

    for y in (range.min_y..range.max_y).filter(|y| is_tick(*y)) {
        let text = tick_text(y);
        let metrics = measure.measure(&text);
        labels.push(Label {
            x: area.x - LABEL_GAP - metrics.width as i64,
            baseline: centered_baseline(transform.row_center(y), metrics.ascent, metrics.descent),
            text,
            axis: Axis::Y,
            kind: LabelKind::Tick,
        });
    }

    let x_axis_row = transform.row_center(0);
    let minus_x = measure.measure("-X");
    labels.push(Label {
        text: "-X".to_string(),
        x: area.x - LABEL_GAP - minus_x.width as i64,
        baseline: centered_baseline(x_axis_row, minus_x.ascent, minus_x.descent),
        axis: Axis::X,
        kind: LabelKind::End,
    });
    let plus_x = measure.measure("+X");
    labels.push(Label {
        text: "+X".to_string(),
        x: area.right() + LABEL_GAP,
        baseline: centered_baseline(x_axis_row, plus_x.ascent, plus_x.descent),
        axis: Axis::X,
        kind: LabelKind::End,
    });

    let y_axis_column = transform.column_center(0);
    let plus_y = measure.measure("+Y");
    labels.push(Label {
        text: "+Y".to_string(),
        x: (y_axis_column - plus_y.width as f64 / 2.0).round() as i64,
        baseline: area.y - LABEL_GAP - plus_y.descent as i64,
        axis: Axis::Y,
        kind: LabelKind::End,
    });
    let minus_y = measure.measure("-Y");
    labels.push(Label {
        text: "-Y".to_string(),
        x: (y_axis_column - minus_y.width as f64 / 2.0).round() as i64,
        baseline: area.bottom() + LABEL_GAP + minus_y.ascent as i64,
        axis: Axis::Y,
        kind: LabelKind::End,
    });

    labels
}

/// Paint the labels with `font`.
pub fn draw_labels<F: TextRaster + ?Sized>(canvas: &mut Canvas, labels: &[Label], font: &F) {
    for label in labels {
        font.draw(
            canvas,
            label.x,
            label.baseline,
            &label.text,
            label.axis.color(),
            label.opacity(),
        );
    }
}
