use anyhow::{Result, bail};

use crate::columns::{ColumnDef, columns};
use crate::model::PlayerRecord;
use crate::protocol::OutboundMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    FitColumns,
    FitData,
}

pub fn layout_for_width(viewport_width: u32, breakpoint_px: u32) -> LayoutMode {
    if viewport_width >= breakpoint_px {
        LayoutMode::FitColumns
    } else {
        LayoutMode::FitData
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub layout: LayoutMode,
    pub index_field: &'static str,
    pub columns: Vec<ColumnDef>,
    pub header_sort: bool,
    pub selectable: bool,
}

impl TableSpec {
    pub fn new(layout: LayoutMode) -> Self {
        Self {
            layout,
            index_field: "nom",
            columns: columns(),
            header_sort: true,
            selectable: false,
        }
    }
}

pub trait TableSurface {
    fn build(&mut self, spec: TableSpec, rows: Vec<PlayerRecord>) -> Result<()>;
    fn replace_data(&mut self, rows: Vec<PlayerRecord>) -> Result<()>;
    fn set_layout(&mut self, layout: LayoutMode) -> Result<()>;
    fn redraw(&mut self, force: bool) -> Result<()>;
}

pub trait HostChannel {
    fn post_to_parent(&mut self, msg: &OutboundMessage) -> Result<()>;
}

/// Table surface that keeps what it was told to show.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    spec: Option<TableSpec>,
    rows: Vec<PlayerRecord>,
    builds: usize,
    replacements: usize,
    redraws: usize,
    pub fail_build: bool,
    pub fail_redraw: bool,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_built(&self) -> bool {
        self.spec.is_some()
    }

    pub fn spec(&self) -> Option<&TableSpec> {
        self.spec.as_ref()
    }

    pub fn layout(&self) -> Option<LayoutMode> {
        self.spec.as_ref().map(|spec| spec.layout)
    }

    pub fn rows(&self) -> &[PlayerRecord] {
        &self.rows
    }

    pub fn row_names(&self) -> Vec<&str> {
        self.rows.iter().map(PlayerRecord::sort_name).collect()
    }

    pub fn build_count(&self) -> usize {
        self.builds
    }

    pub fn replace_count(&self) -> usize {
        self.replacements
    }

    pub fn redraw_count(&self) -> usize {
        self.redraws
    }
}

impl TableSurface for MemorySurface {
    fn build(&mut self, spec: TableSpec, rows: Vec<PlayerRecord>) -> Result<()> {
        if self.fail_build {
            bail!("table container unavailable");
        }
        if self.spec.is_some() {
            bail!("table already built");
        }
        self.spec = Some(spec);
        self.rows = rows;
        self.builds += 1;
        Ok(())
    }

    fn replace_data(&mut self, rows: Vec<PlayerRecord>) -> Result<()> {
        if self.spec.is_none() {
            bail!("replace_data before build");
        }
        self.rows = rows;
        self.replacements += 1;
        Ok(())
    }

    fn set_layout(&mut self, layout: LayoutMode) -> Result<()> {
        let Some(spec) = self.spec.as_mut() else {
            bail!("set_layout before build");
        };
        spec.layout = layout;
        Ok(())
    }

    fn redraw(&mut self, _force: bool) -> Result<()> {
        if self.fail_redraw {
            bail!("redraw failed");
        }
        self.redraws += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub sent: Vec<OutboundMessage>,
    pub fail: bool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HostChannel for MemoryHost {
    fn post_to_parent(&mut self, msg: &OutboundMessage) -> Result<()> {
        if self.fail {
            bail!("no parent frame");
        }
        self.sent.push(msg.clone());
        Ok(())
    }
}
