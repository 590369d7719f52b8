use crate::container::{Container, Placement};
use crate::types::Dims;

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 40.0;

/// Top view (x across, y down) of every layer of the container.
pub fn render_layers(container: &Container<'_>) -> String {
    let dims = container.dims();
    let mut out = String::new();
    for z in 0..dims.depth {
        out.push_str(&format!("Layer z={}:\n", z));
        out.push_str(&render_layer(dims, container.placements(), z));
    }
    out
}

/// Draws the footprints of the placements that occupy layer `z`.
pub fn render_layer(bounds: Dims, placements: &[Placement<'_>], z: u32) -> String {
    let scale = f64::min(
        MAX_WIDTH / bounds.width as f64,
        MAX_HEIGHT / bounds.height as f64,
    );
    let grid_w = (bounds.width as f64 * scale).round() as usize;
    let grid_h = (bounds.height as f64 * scale).round() as usize;

    if grid_w == 0 || grid_h == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; grid_w + 1]; grid_h + 1];
    draw_rect(&mut grid, 0, 0, grid_w, grid_h);

    let in_layer = placements
        .iter()
        .filter(|p| p.position.z <= z && z < p.position.z + p.orientation.depth);

    for p in in_layer {
        let sx = (p.position.x as f64 * scale).round() as usize;
        let sy = (p.position.y as f64 * scale).round() as usize;
        let sw = (p.orientation.width as f64 * scale).round() as usize;
        let sh = (p.orientation.height as f64 * scale).round() as usize;

        if sw == 0 || sh == 0 {
            continue;
        }

        draw_rect(&mut grid, sx, sy, sw, sh);
        write_label(&mut grid, p.item.id(), sx, sy, sw, sh);
    }

    let mut result = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

/// Centers `label` inside the rectangle, clipped to its interior.
fn write_label(grid: &mut [Vec<char>], label: &str, x: usize, y: usize, w: usize, h: usize) {
    if w <= 2 || h == 0 {
        return;
    }
    let chars: Vec<char> = label.chars().take(w - 1).collect();
    let cx = x + w / 2;
    let cy = y + h / 2;
    let start_x = cx.saturating_sub(chars.len() / 2);

    for (i, &ch) in chars.iter().enumerate() {
        let col = start_x + i;
        if col > x && col < x + w && cy > y && cy < y + h {
            grid[cy][col] = ch;
        }
    }
}

fn merge_edge(current: char, edge: char) -> char {
    match (current, edge) {
        ('+', _) => '+',
        ('|', '-') | ('-', '|') => '+',
        _ => edge,
    }
}

fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = grid.len();
    let cols = match grid.first() {
        Some(row) => row.len(),
        None => return,
    };

    for col in (x..=x + w).filter(|&c| c < cols) {
        for row in [y, y + h].into_iter().filter(|&r| r < rows) {
            grid[row][col] = merge_edge(grid[row][col], '-');
        }
    }

    for row in (y..=y + h).filter(|&r| r < rows) {
        for col in [x, x + w].into_iter().filter(|&c| c < cols) {
            grid[row][col] = merge_edge(grid[row][col], '|');
        }
    }

    for cx in [x, x + w] {
        for cy in [y, y + h] {
            if cy < rows && cx < cols {
                grid[cy][cx] = '+';
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Item, Position};

    #[test]
    fn test_render_single_item() {
        let a = Item::new("crate", Dims::new(10, 5, 1), 1.0, 1.0).unwrap();
        let mut c = Container::new(Dims::new(10, 5, 1)).unwrap();
        c.place(&a, Position::ORIGIN, a.dims());
        let output = render_layer(c.dims(), c.placements(), 0);
        assert!(output.contains('+'));
        assert!(output.contains('-'));
        assert!(output.contains('|'));
        assert!(output.contains("crate"));
    }

    #[test]
    fn test_render_skips_other_layers() {
        let a = Item::new("low", Dims::new(4, 4, 1), 1.0, 1.0).unwrap();
        let b = Item::new("high", Dims::new(4, 4, 1), 1.0, 1.0).unwrap();
        let mut c = Container::new(Dims::new(4, 4, 2)).unwrap();
        c.place(&a, Position::ORIGIN, a.dims());
        c.place(&b, Position::new(0, 0, 1), b.dims());

        let ground = render_layer(c.dims(), c.placements(), 0);
        assert!(ground.contains("low"));
        assert!(!ground.contains("high"));

        let all = render_layers(&c);
        assert!(all.contains("Layer z=0:"));
        assert!(all.contains("Layer z=1:"));
        assert!(all.contains("high"));
    }

    #[test]
    fn test_render_empty() {
        let c = Container::new(Dims::new(8, 8, 8)).unwrap();
        let output = render_layer(c.dims(), c.placements(), 0);
        // the container border is always drawn
        assert!(output.contains('+'));
    }
}
