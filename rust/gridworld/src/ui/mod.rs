//! Fixed-width text views of value tables and policies.
use crate::*;
use itertools::Itertools;
use ndarray::Array2;

const TERMINAL: char = 'o';
const WALL: char = '#';

/// One line per grid row, every value centred in a 7 character cell.
pub fn show_values(env: &GridWorld, v: &Array2<Continous>) -> String {
    (0..env.height())
        .map(|r| {
            let cells = (0..env.width())
                .map(|c| format!("{:^7.3}", v.get((r, c)).copied().unwrap_or_default()))
                .join("|");
            format!("|{cells}|")
        })
        .join("\n")
}

/// Arrows for the chosen action, `o` on terminal cells and `#` on walls.
pub fn show_policy(env: &GridWorld, pi: &TabularPolicy) -> String {
    (0..env.height())
        .map(|r| {
            let cells = (0..env.width())
                .map(|c| {
                    let s = (r, c);
                    let symbol = if env.is_terminal(s) {
                        TERMINAL
                    } else if env.is_wall(s) {
                        WALL
                    } else {
                        pi.get(s).map_or(' ', Action::symbol)
                    };
                    format!("   {symbol}   ")
                })
                .join("|");
            format!("|{cells}|")
        })
        .join("\n")
}
