//! Per-table audit schema planning.
//!
//! Existing columns the table shape names are always dropped and re-added with
//! the expected definition, and every expected index is dropped and re-added.
//! This blind replace converges even on stores without partial alters; the
//! platform diff afterwards reduces unchanged elements to no statements.

use {
    crate::domain::naming::TableName,
    crate::domain::schema::{AuditTableSpec, ColumnDef, IndexDef, IndexKind, TableDef},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOp {
    AddColumn(ColumnDef),
    DropColumn(String),
    AddIndex(IndexDef),
    DropIndex(String),
    SetPrimaryKey(Vec<String>),
    DropPrimaryKey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiffPlan {
    ops: Vec<SchemaOp>,
}

impl SchemaDiffPlan {
    pub fn ops(&self) -> &[SchemaOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    fn push(&mut self, op: SchemaOp) {
        self.ops.push(op);
    }

    /// Applies the ops in order, then prunes indices whose columns are gone.
    pub fn apply_to(&self, table: &mut TableDef) {
        for op in &self.ops {
            match op {
                SchemaOp::AddColumn(column) => table.add_column(column.clone()),
                SchemaOp::DropColumn(name) => table.drop_column(name),
                SchemaOp::AddIndex(index) => table.add_index(index.clone()),
                SchemaOp::DropIndex(name) => table.drop_index(name),
                SchemaOp::SetPrimaryKey(columns) => table.set_primary_key(columns.clone()),
                SchemaOp::DropPrimaryKey => table.drop_primary_key(),
            }
        }
        table.prune_dangling_indices();
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaDiffer {
    spec: AuditTableSpec,
}

impl SchemaDiffer {
    pub fn new(spec: AuditTableSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &AuditTableSpec {
        &self.spec
    }

    /// Fresh audit table: all columns, then secondary indices, primary key last.
    pub fn plan_for_new_table(&self, name: TableName) -> TableDef {
        let mut table = TableDef::new(name);
        let plan = self.creation_plan(&table.name);
        plan.apply_to(&mut table);
        table
    }

    fn creation_plan(&self, name: &TableName) -> SchemaDiffPlan {
        let mut plan = SchemaDiffPlan::default();
        for column in &self.spec.columns {
            plan.push(SchemaOp::AddColumn(column.clone()));
        }
        for index in self.spec.indices_for(name) {
            match index.kind {
                IndexKind::Primary => plan.push(SchemaOp::SetPrimaryKey(index.columns)),
                IndexKind::Secondary => plan.push(SchemaOp::AddIndex(IndexDef {
                    name: index.name,
                    columns: index.columns,
                    unique: false,
                })),
            }
        }
        plan
    }

    /// Ops converging `current` onto the expected shape. Existing columns come
    /// first in their current order, then missing ones in declaration order.
    pub fn plan_for_existing_table(&self, current: &TableDef) -> SchemaDiffPlan {
        let mut plan = SchemaDiffPlan::default();

        for column in &current.columns {
            plan.push(SchemaOp::DropColumn(column.name.clone()));
            if let Some(expected) = self.spec.column(&column.name) {
                plan.push(SchemaOp::AddColumn(expected.clone()));
            }
        }

        for expected in &self.spec.columns {
            if !current.has_column(&expected.name) {
                plan.push(SchemaOp::AddColumn(expected.clone()));
            }
        }

        for index in self.spec.indices_for(&current.name) {
            match index.kind {
                IndexKind::Primary => {
                    plan.push(SchemaOp::DropPrimaryKey);
                    plan.push(SchemaOp::SetPrimaryKey(index.columns));
                }
                IndexKind::Secondary => {
                    if current.has_index(&index.name) {
                        plan.push(SchemaOp::DropIndex(index.name.clone()));
                    }
                    plan.push(SchemaOp::AddIndex(IndexDef {
                        name: index.name,
                        columns: index.columns,
                        unique: false,
                    }));
                }
            }
        }

        plan
    }

    /// Applies [`SchemaDiffer::plan_for_existing_table`] to a copy of `current`.
    pub fn update_table(&self, current: &TableDef) -> TableDef {
        let mut table = current.clone();
        self.plan_for_existing_table(current).apply_to(&mut table);
        table
    }
}
