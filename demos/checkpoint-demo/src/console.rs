//! Terminal stand-ins for the display, buzzer and diagnostics port

use std::io::{self, Write};

use checkpoint_runtime::{Diagnostics, FeedbackDevice, FeedbackPattern, LightPattern, Presenter, Screen, Tone};

const WIDTH: usize = 16;

/// Draws the two-line display as a boxed panel
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl Presenter for ConsoleDisplay {
    fn show(&mut self, screen: &Screen) {
        let border = "─".repeat(WIDTH + 2);
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "┌{border}┐");
        let _ = writeln!(out, "│ {} │", fit(&screen.line1));
        let _ = writeln!(out, "│ {} │", fit(&screen.line2));
        let _ = writeln!(out, "└{border}┘");
        let _ = out.flush();
    }
}

/// Pads or clips to the panel width
fn fit(line: &str) -> String {
    let clipped: String = line.chars().take(WIDTH).collect();
    format!("{clipped:<WIDTH$}")
}

/// Prints tones and light patterns instead of playing them
#[derive(Debug, Default)]
pub struct ConsoleFeedback;

impl FeedbackDevice for ConsoleFeedback {
    fn play(&mut self, pattern: FeedbackPattern) {
        let text = match pattern {
            FeedbackPattern::Tone(Tone::Startup) => "♪ startup",
            FeedbackPattern::Tone(Tone::Success) => "♪ beep",
            FeedbackPattern::Tone(Tone::Exit) => "♪ beep-boop",
            FeedbackPattern::Tone(Tone::Unknown) => "♪ buzz",
            FeedbackPattern::Tone(Tone::Error) => "♪ buzz-buzz",
            FeedbackPattern::Tone(Tone::Warning) => "♪ chirp",
            FeedbackPattern::Tone(Tone::Alarm) => "♪ alarm",
            FeedbackPattern::Light(LightPattern::GreenBlinkX3) => "● green x3",
            FeedbackPattern::Light(LightPattern::RedBlinkX5) => "● red x5",
            FeedbackPattern::Light(LightPattern::Off) => return,
        };
        println!("  {text}");
    }
}

/// Diagnostics written straight to stderr
#[derive(Debug, Default)]
pub struct ConsoleDiagnostics;

impl Diagnostics for ConsoleDiagnostics {
    fn record(&mut self, line: &str) {
        eprintln!("{line}");
    }
}
