//! Board topology and logical hit-testing
//!
//! Columns and cards are plain data: each visible status owns a column
//! rectangle and an ordered list of card rectangles, in the same relative order
//! as the flat record sequence. Drop classification is computed against this
//! model instead of walking a rendering tree.

use serde::{Deserialize, Serialize};

use shared::{Investor, InvestorStatus, RecordId};

/// Pointer position in board coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Half-open containment: left/top edges inside, right/bottom outside
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.mid_y())
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Where the dragged card lands relative to the target card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertSide {
    Before,
    After,
}

impl InsertSide {
    /// Pointer strictly above the card midpoint inserts before it
    pub fn from_pointer(card: &Rect, pointer_y: f64) -> Self {
        if pointer_y < card.mid_y() {
            InsertSide::Before
        } else {
            InsertSide::After
        }
    }
}

/// Classification of the element under the pointer at drop time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DropTarget {
    /// Another card, with the insertion side computed from its midpoint
    Card {
        id: RecordId,
        status: InvestorStatus,
        side: InsertSide,
    },
    /// Empty area of a column
    Column { status: InvestorStatus },
    /// The delete overlay shown while dragging
    DeleteZone,
    /// Nothing droppable
    Outside,
}

/// Fixed geometry used to stack columns and cards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub column_width: f64,
    pub column_gap: f64,
    pub header_height: f64,
    pub card_height: f64,
    pub card_gap: f64,
    /// Space kept below the last card so empty columns still accept drops
    pub min_body_height: f64,
    pub delete_zone: Option<Rect>,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            column_width: 280.0,
            column_gap: 16.0,
            header_height: 48.0,
            card_height: 96.0,
            card_gap: 8.0,
            min_body_height: 120.0,
            delete_zone: Some(Rect::new(0.0, -96.0, 6.0 * 296.0, 80.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardSlot {
    pub id: RecordId,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub status: InvestorStatus,
    pub rect: Rect,
    pub cards: Vec<CardSlot>,
}

impl ColumnLayout {
    pub fn card_ids(&self) -> Vec<&RecordId> {
        self.cards.iter().map(|card| &card.id).collect()
    }
}

/// Rendered board: one column per visible status plus the delete zone
#[derive(Debug, Clone, PartialEq)]
pub struct BoardLayout {
    pub columns: Vec<ColumnLayout>,
    pub delete_zone: Option<Rect>,
}

impl BoardLayout {
    /// Stack the visible columns left to right and their cards top to bottom
    pub fn build(records: &[Investor], statuses: &[InvestorStatus], query: &str, metrics: &LayoutMetrics) -> Self {
        let columns = statuses
            .iter()
            .enumerate()
            .map(|(column_index, status)| {
                let x = column_index as f64 * (metrics.column_width + metrics.column_gap);
                let mut cards = Vec::new();
                let mut y = metrics.header_height;

                for record in records
                    .iter()
                    .filter(|record| record.status == *status && matches_query(record, query))
                {
                    cards.push(CardSlot {
                        id: record.id.clone(),
                        rect: Rect::new(x, y, metrics.column_width, metrics.card_height),
                    });
                    y += metrics.card_height + metrics.card_gap;
                }

                let height = y + metrics.min_body_height;
                ColumnLayout {
                    status: *status,
                    rect: Rect::new(x, 0.0, metrics.column_width, height),
                    cards,
                }
            })
            .collect();

        Self {
            columns,
            delete_zone: metrics.delete_zone,
        }
    }

    /// Classify the pointer position; the delete zone overlays everything
    pub fn hit_test(&self, pointer: Point) -> DropTarget {
        if self.delete_zone.is_some_and(|zone| zone.contains(pointer)) {
            return DropTarget::DeleteZone;
        }

        let Some(column) = self.columns.iter().find(|column| column.rect.contains(pointer)) else {
            return DropTarget::Outside;
        };

        match column.cards.iter().find(|card| card.rect.contains(pointer)) {
            Some(card) => DropTarget::Card {
                id: card.id.clone(),
                status: column.status,
                side: InsertSide::from_pointer(&card.rect, pointer.y),
            },
            None => DropTarget::Column { status: column.status },
        }
    }

    pub fn column(&self, status: InvestorStatus) -> Option<&ColumnLayout> {
        self.columns.iter().find(|column| column.status == status)
    }

    /// Rectangle of a rendered card, if it is visible
    pub fn card_rect(&self, id: &RecordId) -> Option<Rect> {
        self.columns
            .iter()
            .flat_map(|column| column.cards.iter())
            .find(|card| &card.id == id)
            .map(|card| card.rect)
    }
}

/// Columns shown on the board; the dropped column can be hidden
pub fn visible_statuses(show_dropped: bool) -> Vec<InvestorStatus> {
    InvestorStatus::ALL
        .into_iter()
        .filter(|status| show_dropped || !status.is_terminal())
        .collect()
}

/// Case-insensitive search over name, type, description and email
pub fn matches_query(record: &Investor, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    [&record.name, &record.kind, &record.description, &record.email]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}
