use serde::Serialize;

use crate::models::OrderLine;

/// In-memory basket of one customer view. Never persisted.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Cart {
    lines: Vec<OrderLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines carrying a note are kept apart so each keeps its own comment.
    pub fn add_item(&mut self, id: &str, name: &str, price: f64) {
        match self
            .lines
            .iter_mut()
            .find(|line| line.id == id && line.note.is_empty())
        {
            Some(line) => line.qty += 1,
            None => self.lines.push(OrderLine {
                id: id.to_string(),
                name: name.to_string(),
                price,
                qty: 1,
                note: String::new(),
            }),
        }
    }

    pub fn update_qty(&mut self, index: usize, delta: i32) {
        let Some(line) = self.lines.get_mut(index) else {
            return;
        };
        let qty = line.qty as i64 + delta as i64;
        if qty <= 0 {
            self.lines.remove(index);
        } else {
            line.qty = qty as u32;
        }
    }

    pub fn set_note(&mut self, index: usize, note: &str) {
        if let Some(line) = self.lines.get_mut(index) {
            line.note = note.trim().to_string();
        }
    }

    pub fn count(&self) -> u32 {
        self.lines.iter().map(|line| line.qty).sum()
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(OrderLine::subtotal).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
