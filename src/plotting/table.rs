//! Table renderer.

use super::{
    AxisDecor, DrawArgs, Plot, PlotContext, PlotResult, check_stack, clamp_frame, prepare_axes,
    update_title,
};
use crate::DataViewError;
use crate::figure::{AxesHandle, Figure, TableCell, TableHandle};
use crate::options::PlotSettings;
use crate::views::{Bounds, CellType, CellValue, Plottable, Stack, TableView, View, ViewKind};

const ELLIPSIS: &str = "...";

/// Format a cell value for display.
///
/// Floats use `float_precision` decimals; anything longer than
/// `max_value_len` characters is cut and suffixed with `...` so that the
/// result is exactly `max_value_len` long.
pub fn pprint(value: &CellValue, settings: &PlotSettings) -> String {
    let text = match value {
        CellValue::Float(v) => format!("{v:.prec$}", prec = settings.float_precision),
        other => other.to_string(),
    };
    if text.chars().count() > settings.max_value_len {
        let keep = settings.max_value_len.saturating_sub(ELLIPSIS.len());
        let mut cut: String = text.chars().take(keep).collect();
        cut.push_str(ELLIPSIS);
        cut
    } else {
        text
    }
}

#[derive(Debug, Clone, Copy)]
struct TableState {
    axes: AxesHandle,
    table: TableHandle,
    shape: (usize, usize),
}

/// Draws a stack of [`TableView`]s as a text grid.
#[derive(Debug)]
pub struct TablePlot {
    stack: Stack,
    context: PlotContext,
    state: Option<TableState>,
}

impl TablePlot {
    pub const NAME: &'static str = "TablePlot";

    pub fn new(source: impl Into<Plottable>, context: PlotContext) -> PlotResult<Self> {
        Ok(Self {
            stack: check_stack(source.into(), Self::NAME, ViewKind::Table)?,
            context,
            state: None,
        })
    }

    pub(crate) fn boxed(source: Plottable, context: PlotContext) -> PlotResult<Box<dyn Plot>> {
        Ok(Box::new(Self::new(source, context)?))
    }

    pub fn table_handle(&self) -> Option<TableHandle> {
        self.state.map(|s| s.table)
    }

    fn table_at(&self, n: usize) -> PlotResult<&TableView> {
        match self.stack.view(n) {
            Some(View::Table(table)) => Ok(table),
            _ => Err(DataViewError::structure("table stack holds a non-table view")),
        }
    }

    fn cells(&self, table: &TableView) -> Vec<Vec<TableCell>> {
        (0..table.rows())
            .map(|r| {
                (0..table.cols())
                    .map(|c| {
                        let heading = table.cell_type(r, c) == CellType::Heading;
                        TableCell {
                            text: table
                                .cell_value(r, c)
                                .map(|v| pprint(v, &self.context.settings))
                                .unwrap_or_default(),
                            bold: heading,
                            monospace: heading,
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

impl Plot for TablePlot {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn settings(&self) -> &PlotSettings {
        &self.context.settings
    }

    fn frame_count(&self) -> usize {
        self.stack.len()
    }

    fn render_into(
        &mut self,
        figure: &mut Figure,
        axes: Option<AxesHandle>,
        _args: DrawArgs,
    ) -> PlotResult<AxesHandle> {
        let table = self.table_at(self.stack.len() - 1)?;
        let axes = prepare_axes(
            figure,
            axes,
            &self.context.settings,
            AxisDecor {
                title: table.metadata.title.as_deref(),
                owns_title: self.context.owns_title(),
                ..AxisDecor::default()
            },
        )?;
        figure.axes_mut(axes)?.axis_visible = false;

        let border = self.context.settings.table_border;
        let bbox = Bounds::new(border, border, 1.0 - border, 1.0 - border);
        let max_font_size = self.context.settings.max_font_size;
        let handle = figure.add_table(axes, self.cells(table), bbox, max_font_size)?;
        figure.auto_font_size(handle, max_font_size)?;

        self.state = Some(TableState {
            axes,
            table: handle,
            shape: (table.rows(), table.cols()),
        });
        Ok(axes)
    }

    fn render_frame(&mut self, figure: &mut Figure, n: usize) -> PlotResult<()> {
        let state = self.state.ok_or(DataViewError::NotRendered(Self::NAME))?;
        let table = self.table_at(clamp_frame(n, self.stack.len()))?;
        if (table.rows(), table.cols()) != state.shape {
            return Err(DataViewError::structure(format!(
                "table frame {n} is {}x{} but a {}x{} table is drawn",
                table.rows(),
                table.cols(),
                state.shape.0,
                state.shape.1
            )));
        }

        for (r, row) in self.cells(table).into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                figure.set_cell_text(state.table, r, c, cell.text)?;
            }
        }
        figure.auto_font_size(state.table, self.context.settings.max_font_size)?;
        update_title(figure, state.axes, &self.context, table.metadata.title.as_deref())
    }
}
