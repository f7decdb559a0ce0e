//! What the display is told, and how a chart of it is laid out.
//!
//! The crate never draws. A [`Dashboard`] implementation receives a
//! [`LiveReading`] on every sampling tick and one [`RunSummary`] at the end
//! of a run. [`LiveReading::lines`] and [`ChartLayout`] do the formatting
//! and geometry so a dashboard only has to put text and lines on screen.

use core::fmt::Write;

use heapless::String;

use crate::sample::{AxisSample, VelocitySample};

/// Consumer of pipeline output, usually an LCD.
///
/// ```
/// use core::convert::Infallible;
/// use gyro_odometer::presentation::{Dashboard, LiveReading, RunSummary, PROMPT, RESTART_HINT};
///
/// struct Console;
///
/// impl Dashboard for Console {
///     type Error = Infallible;
///
///     fn show_prompt(&mut self) -> Result<(), Infallible> {
///         PROMPT.iter().for_each(|line| println!("{}", line));
///         Ok(())
///     }
///
///     fn show_live(&mut self, reading: &LiveReading) -> Result<(), Infallible> {
///         reading.lines().iter().for_each(|line| println!("{}", line));
///         Ok(())
///     }
///
///     fn show_summary(&mut self, summary: &RunSummary<'_>) -> Result<(), Infallible> {
///         println!("{}", summary.distance_line());
///         RESTART_HINT.iter().for_each(|line| println!("{}", line));
///         Ok(())
///     }
/// }
///
/// let summary = RunSummary { series: &[], total_distance: 1.5 };
/// assert!(Console.show_summary(&summary).is_ok());
/// ```
pub trait Dashboard {
    type Error;

    /// Idle screen asking for the start trigger.
    fn show_prompt(&mut self) -> Result<(), Self::Error>;

    fn show_live(&mut self, reading: &LiveReading) -> Result<(), Self::Error>;

    fn show_summary(&mut self, summary: &RunSummary<'_>) -> Result<(), Self::Error>;
}

/// Text shown on the idle screen.
pub const PROMPT: [&str; 2] = ["Press the blue", "button to start."];

/// Text shown under the summary chart.
pub const RESTART_HINT: [&str; 2] = ["Press again", "to restart."];

pub const LINE_CAPACITY: usize = 24;

pub type Line = String<LINE_CAPACITY>;

/// One sampling tick's worth of display data.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct LiveReading {
    pub tick: usize,
    /// Validated angular velocity
    pub axes: AxisSample,
    pub velocity: VelocitySample,
    /// Seconds since the first tick of the run
    pub elapsed: f32,
}

impl LiveReading {
    /// Angular velocity rows, velocity rows and the elapsed time, in that
    /// order.
    pub fn lines(&self) -> [Line; 7] {
        let axes = self.axes.to_array();
        let velocity = self.velocity.to_array();
        let names = ['X', 'Y', 'Z'];
        let mut lines: [Line; 7] = Default::default();
        for i in 0..3 {
            let _ = write!(lines[i], "{} Raw_S: {:5.2}", names[i], axes[i]);
            let _ = write!(lines[3 + i], "{} Lin_S: {:5.2}", names[i], velocity[i]);
        }
        let _ = write!(lines[6], "{:5.2} s", self.elapsed);
        lines
    }
}

/// End-of-run display data.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunSummary<'a> {
    /// Uncalibrated per-tick distance contributions
    pub series: &'a [f32],
    /// Calibrated distance
    pub total_distance: f64,
}

impl RunSummary<'_> {
    pub fn distance_line(&self) -> Line {
        let mut line = Line::new();
        let _ = write!(line, "{:5.2} m", self.total_distance);
        line
    }
}

/// Chart values are plotted in centimetres.
pub const CHART_SCALE: f32 = 100.0;

/// Spacing between the screen edge and the chart axes.
pub const CHART_MARGIN: i32 = 10;

/// Number of labelled y-axis ticks.
pub const Y_TICKS: usize = 5;

/// X-axis tick spacing, in samples.
pub const X_TICK_STEP: usize = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// Line chart geometry in the top half of a `width` x `height` screen.
///
/// The x axis spans `slots` samples, the y axis is scaled so the largest
/// value reaches the top. Series whose largest value is below one
/// centimetre produce no y ticks and no line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct ChartLayout {
    width: i32,
    height: i32,
    slots: usize,
}

impl ChartLayout {
    pub const fn new(width: i32, height: i32, slots: usize) -> Self {
        Self {
            width,
            height,
            slots,
        }
    }

    /// Screen row of the x axis.
    pub fn baseline(&self) -> i32 {
        self.height / 2 - CHART_MARGIN
    }

    fn plot_height(&self) -> f32 {
        (self.height / 2 - 2 * CHART_MARGIN) as f32
    }

    pub fn x_axis(&self) -> Segment {
        Segment {
            from: Point {
                x: CHART_MARGIN,
                y: self.baseline(),
            },
            to: Point {
                x: self.width - CHART_MARGIN,
                y: self.baseline(),
            },
        }
    }

    pub fn y_axis(&self) -> Segment {
        Segment {
            from: Point {
                x: CHART_MARGIN,
                y: CHART_MARGIN,
            },
            to: Point {
                x: CHART_MARGIN,
                y: self.baseline(),
            },
        }
    }

    /// Screen column of sample `index`.
    pub fn x_at(&self, index: usize) -> i32 {
        let slots = self.slots.max(1) as i32;
        CHART_MARGIN + (index as i32 * (self.width - 2 * CHART_MARGIN)) / slots
    }

    /// Largest value of `series`, in centimetres.
    pub fn max_value(series: &[f32]) -> f32 {
        series
            .iter()
            .map(|v| v * CHART_SCALE)
            .fold(None, |max: Option<f32>, v| match max {
                Some(m) if m >= v => Some(m),
                _ => Some(v),
            })
            .unwrap_or(0.0)
    }

    fn y_for(&self, centimetres: f32, max: f32) -> i32 {
        self.baseline() - ((centimetres / max) * self.plot_height()) as i32
    }

    /// Column and label of every x-axis tick, `0, 5, .., slots`.
    pub fn x_ticks(&self) -> impl Iterator<Item = (i32, usize)> + '_ {
        (0..=self.slots)
            .step_by(X_TICK_STEP)
            .map(move |i| (self.x_at(i), i))
    }

    /// Row and value (cm) of every y-axis tick, empty below one centimetre.
    pub fn y_ticks(&self, series: &[f32]) -> heapless::Vec<(i32, f32), Y_TICKS> {
        let mut ticks = heapless::Vec::new();
        let max = Self::max_value(series);
        if max >= 1.0 {
            for i in 1..=Y_TICKS {
                let value = (max / Y_TICKS as f32) * i as f32;
                let _ = ticks.push((self.y_for(value, max), value));
            }
        }
        ticks
    }

    /// Polyline through the series, empty below one centimetre.
    pub fn segments<'a>(&'a self, series: &'a [f32]) -> impl Iterator<Item = Segment> + 'a {
        let max = Self::max_value(series);
        let drawable: &[f32] = if max >= 1.0 { series } else { &[] };
        drawable
            .windows(2)
            .enumerate()
            .map(move |(i, pair)| Segment {
                from: Point {
                    x: self.x_at(i),
                    y: self.y_for(pair[0] * CHART_SCALE, max),
                },
                to: Point {
                    x: self.x_at(i + 1),
                    y: self.y_for(pair[1] * CHART_SCALE, max),
                },
            })
    }
}
