use crate::format::{display_num, escape_attr, escape_html, initials};
use crate::model::PlayerRecord;

pub const YELLOW_CARD_COLOR: &str = "#f59e0b";
pub const RED_CARD_COLOR: &str = "#ef4444";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnId {
    Player,
    Goals,
    Assists,
    YellowCards,
    RedCards,
    Comments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKind {
    Text,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub id: ColumnId,
    pub title: &'static str,
    pub field: &'static str,
    pub sorter: SortKind,
    pub align: Align,
    pub width: Option<u16>,
    pub min_width: Option<u16>,
    /// Share of leftover width; 0 keeps the natural width.
    pub width_grow: u16,
    pub start_dir: Option<SortDir>,
}

impl ColumnDef {
    fn stat(id: ColumnId, title: &'static str, field: &'static str, width: u16) -> Self {
        Self {
            id,
            title,
            field,
            sorter: SortKind::Number,
            align: Align::Center,
            width: Some(width),
            min_width: None,
            width_grow: 0,
            start_dir: None,
        }
    }
}

pub fn columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef {
            id: ColumnId::Player,
            title: "Joueur",
            field: "nom",
            sorter: SortKind::Text,
            align: Align::Left,
            width: None,
            min_width: Some(145),
            width_grow: 1,
            start_dir: None,
        },
        ColumnDef {
            start_dir: Some(SortDir::Desc),
            ..ColumnDef::stat(ColumnId::Goals, "Buts", "but", 88)
        },
        ColumnDef::stat(ColumnId::Assists, "Passes", "passes", 96),
        ColumnDef::stat(ColumnId::YellowCards, "Jaunes", "jaune", 96),
        ColumnDef::stat(ColumnId::RedCards, "Rouges", "rouge", 96),
        ColumnDef {
            id: ColumnId::Comments,
            title: "Commentaires",
            field: "commentaires",
            sorter: SortKind::Text,
            align: Align::Left,
            width: None,
            min_width: Some(200),
            width_grow: 1,
            start_dir: None,
        },
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCell {
    pub name: String,
    pub initials: Option<String>,
    pub photo: Option<String>,
    pub jersey: Option<String>,
    /// Profile link; its presence makes the cell clickable.
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellView {
    Player(PlayerCell),
    Stat {
        value: f64,
        highlight: Option<&'static str>,
    },
    Comment {
        text: String,
    },
}

pub fn cell_view(column: ColumnId, row: &PlayerRecord) -> CellView {
    match column {
        ColumnId::Player => {
            let name = escape_html(row.sort_name());
            let photo = row.photo().map(str::to_string);
            CellView::Player(PlayerCell {
                initials: photo.is_none().then(|| initials(&name)),
                name,
                photo,
                jersey: row.jersey().map(str::to_string),
                link: row.link().map(str::to_string),
            })
        }
        ColumnId::Goals => CellView::Stat {
            value: row.goals(),
            highlight: None,
        },
        ColumnId::Assists => CellView::Stat {
            value: row.assists(),
            highlight: None,
        },
        ColumnId::YellowCards => {
            let value = row.yellow_cards();
            CellView::Stat {
                value,
                highlight: (value > 0.0).then_some(YELLOW_CARD_COLOR),
            }
        }
        ColumnId::RedCards => {
            let value = row.red_cards();
            CellView::Stat {
                value,
                highlight: (value > 0.0).then_some(RED_CARD_COLOR),
            }
        }
        ColumnId::Comments => CellView::Comment {
            text: row.comments.clone().unwrap_or_default(),
        },
    }
}

impl CellView {
    pub fn is_interactive(&self) -> bool {
        matches!(self, CellView::Player(cell) if cell.link.is_some())
    }

    pub fn plain_text(&self) -> String {
        match self {
            CellView::Player(cell) => {
                let badge = cell
                    .initials
                    .as_deref()
                    .map(|i| format!("[{i}] "))
                    .unwrap_or_default();
                let jersey = cell
                    .jersey
                    .as_deref()
                    .map(|n| format!(" #{n}"))
                    .unwrap_or_default();
                format!("{badge}{}{jersey}", unescape_basic(&cell.name))
            }
            CellView::Stat { value, .. } => display_num(*value),
            CellView::Comment { text } => text.clone(),
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            CellView::Player(cell) => player_html(cell),
            CellView::Stat { value, highlight } => {
                let value = display_num(*value);
                match highlight {
                    Some(color) => {
                        format!(r#"<div class="stats-cell" style="color:{color}">{value}</div>"#)
                    }
                    None => format!(r#"<div class="stats-cell">{value}</div>"#),
                }
            }
            CellView::Comment { text } => format!(
                r#"<div class="comments-cell" title="{}">{}</div>"#,
                escape_attr(text),
                escape_html(text)
            ),
        }
    }
}

fn player_html(cell: &PlayerCell) -> String {
    let name = &cell.name;
    let photo_html = match (&cell.photo, &cell.initials) {
        (Some(photo), _) => format!(
            r#"<div class="player-photo-wrap" title="Cliquez pour agrandir"><img src="{}" alt="{name}" class="player-photo" onerror="this.style.display='none'"></div>"#,
            escape_attr(photo)
        ),
        (None, badge) => format!(
            r#"<div class="player-photo-wrap initials" title="{name}">{}</div>"#,
            badge.as_deref().unwrap_or("")
        ),
    };
    let jersey_html = cell
        .jersey
        .as_deref()
        .map(|n| format!(r#"<span class="jersey-number">#{}</span>"#, escape_html(n)))
        .unwrap_or_default();
    let content = format!("{photo_html}<div><div>{name}</div>{jersey_html}</div>");
    match &cell.link {
        Some(url) => format!(
            r#"<div class="player-link" data-href="{}">{content}</div>"#,
            escape_attr(url)
        ),
        None => format!(r#"<div class="player-text">{content}</div>"#),
    }
}

fn unescape_basic(escaped: &str) -> String {
    escaped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
