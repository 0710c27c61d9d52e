use std::{fmt, str::FromStr};

use glam::{ivec2, IVec2};

/// Rectangular character map, used for writing level layouts as text.
///
/// Leading blank lines and the common indentation of the lines are stripped
/// so maps can be written as indented string literals. Short lines are
/// padded with spaces to the width of the longest line.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct AsciiMap {
    lines: Vec<Vec<char>>,
}

impl AsciiMap {
    pub fn new(map: &str) -> Self {
        let map = map.trim_end();

        let x_skip = map
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
            .min()
            .unwrap_or(0);

        let mut lines: Vec<Vec<char>> = map
            .lines()
            .skip_while(|line| line.trim().is_empty())
            .map(|line| line.trim_end().chars().skip(x_skip).collect())
            .collect();

        let width = lines.iter().map(|l| l.len()).max().unwrap_or(0);
        for line in &mut lines {
            line.resize(width, ' ');
        }

        AsciiMap { lines }
    }

    /// Build a map by sampling a character for every point of the given size.
    pub fn from_fn(size: IVec2, mut f: impl FnMut(IVec2) -> char) -> Self {
        AsciiMap {
            lines: (0..size.y)
                .map(|y| (0..size.x).map(|x| f(ivec2(x, y))).collect())
                .collect(),
        }
    }

    pub fn size(&self) -> IVec2 {
        ivec2(
            self.lines.first().map_or(0, |l| l.len()) as i32,
            self.lines.len() as i32,
        )
    }

    pub fn get(&self, p: IVec2) -> Option<char> {
        if p.x < 0 || p.y < 0 {
            return None;
        }
        self.lines.get(p.y as usize)?.get(p.x as usize).copied()
    }

    /// Iterate the points and characters of the map in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, char)> + '_ {
        self.lines.iter().enumerate().flat_map(|(y, line)| {
            line.iter()
                .enumerate()
                .map(move |(x, &c)| (ivec2(x as i32, y as i32), c))
        })
    }
}

impl FromStr for AsciiMap {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AsciiMap::new(s))
    }
}

impl fmt::Display for AsciiMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line: String = line.iter().collect();
            write!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
