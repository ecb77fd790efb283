//! Method body fixtures
//!
//! Each fixture lowers a short C#-like snippet into the instruction/CFG
//! model, the way a front end would.

use codegraph_symexec::shared::models::{
    BlockId, CfgBuilder, CfgEdgeKind, Instruction, MethodBody, MethodRef, Nullability, SymbolId, SymbolTable,
    Terminator, Visibility,
};

/// `x.M()` as an instance call without arguments, result discarded
pub fn call_on(symbol: SymbolId, method: &str) -> Vec<Instruction> {
    vec![
        Instruction::load(symbol),
        Instruction::call(MethodRef::new(method), 0),
        Instruction::pop(),
    ]
}

fn public_method(name: &str, cfg: CfgBuilder, symbols: SymbolTable, parameters: Vec<SymbolId>) -> MethodBody {
    MethodBody::new(name, cfg.build().expect("fixture CFG is valid"), symbols)
        .with_visibility(Visibility::Public)
        .with_parameters(parameters)
}

/// ```text
/// public void M(object x) {
///     if (x == null) return;
///     x.M();
/// }
/// ```
pub fn fixture_guarded_access() -> MethodBody {
    let mut symbols = SymbolTable::new();
    let x = symbols.parameter("x", Nullability::Unknown);

    let mut b = CfgBuilder::new();
    let entry = b.block(
        vec![Instruction::load(x), Instruction::null(), Instruction::eq()],
        Terminator::Conditional,
    );
    let early_return = b.block(vec![], Terminator::Return { has_value: false });
    let access = b.block(call_on(x, "M"), Terminator::Return { has_value: false });
    b.branch(entry, early_return, access);

    public_method("GuardedAccess", b, symbols, vec![x])
}

/// ```text
/// public void M(object x) {
///     x.M();
///     if (x == null) { }
/// }
/// ```
pub fn fixture_access_before_check() -> MethodBody {
    let mut symbols = SymbolTable::new();
    let x = symbols.parameter("x", Nullability::Unknown);

    let mut instructions = call_on(x, "M");
    instructions.extend([Instruction::load(x), Instruction::null(), Instruction::eq()]);

    let mut b = CfgBuilder::new();
    let entry = b.block(instructions, Terminator::Conditional);
    let empty_then = b.block(vec![], Terminator::Jump);
    let exit = b.block(vec![], Terminator::Return { has_value: false });
    b.branch(entry, empty_then, exit).jump(empty_then, exit);

    public_method("AccessBeforeCheck", b, symbols, vec![x])
}

/// ```text
/// public void M(object x) {
///     var y = x;
///     if (x != null) { y.M(); }
/// }
/// ```
pub fn fixture_aliased_guard() -> MethodBody {
    let mut symbols = SymbolTable::new();
    let x = symbols.parameter("x", Nullability::Unknown);
    let y = symbols.local("y");

    let mut b = CfgBuilder::new();
    let entry = b.block(
        vec![
            Instruction::load(x),
            Instruction::assign(y),
            Instruction::load(x),
            Instruction::null(),
            Instruction::ne(),
        ],
        Terminator::Conditional,
    );
    let then = b.block(call_on(y, "M"), Terminator::Jump);
    let exit = b.block(vec![], Terminator::Return { has_value: false });
    b.branch(entry, then, exit).jump(then, exit);

    public_method("AliasedGuard", b, symbols, vec![x])
}

/// ```text
/// public void M(int n) {
///     var i = 0;
///     while (i != n) { i = i + 1; }
///     object o = null;
///     o.M();
/// }
/// ```
///
/// Every iteration produces new values, so the walk only ends at the loop
/// unrolling bound or the state budget.
pub fn fixture_counting_loop() -> MethodBody {
    let mut symbols = SymbolTable::new();
    let n = symbols.parameter("n", Nullability::Unknown);
    let i = symbols.local("i");

    let mut b = CfgBuilder::new();
    let init = b.block(vec![Instruction::number(0.0), Instruction::assign(i)], Terminator::Jump);
    let head = b.block(
        vec![Instruction::load(i), Instruction::load(n), Instruction::ne()],
        Terminator::Conditional,
    );
    let body = b.block(
        vec![
            Instruction::load(i),
            Instruction::number(1.0),
            Instruction::binary("+"),
            Instruction::assign(i),
        ],
        Terminator::Jump,
    );
    let after = b.block(
        vec![Instruction::null(), Instruction::member("M"), Instruction::pop()],
        Terminator::Return { has_value: false },
    );
    b.jump(init, head)
        .branch(head, body, after)
        .edge(body, head, CfgEdgeKind::LoopBack);

    public_method("CountingLoop", b, symbols, vec![n])
}

/// ```text
/// void M(object x) {
///     if (x == null) {
///         if (x != null) { ((object)null).M(); }
///     }
/// }
/// ```
pub fn fixture_contradictory_nested_checks() -> MethodBody {
    let mut symbols = SymbolTable::new();
    let x = symbols.parameter("x", Nullability::Unknown);

    let mut b = CfgBuilder::new();
    let outer = b.block(
        vec![Instruction::load(x), Instruction::null(), Instruction::eq()],
        Terminator::Conditional,
    );
    let inner = b.block(
        vec![Instruction::load(x), Instruction::null(), Instruction::ne()],
        Terminator::Conditional,
    );
    let unreachable = b.block(
        vec![Instruction::null(), Instruction::member("M"), Instruction::pop()],
        Terminator::Jump,
    );
    let exit = b.block(vec![], Terminator::Return { has_value: false });
    b.branch(outer, inner, exit)
        .branch(inner, unreachable, exit)
        .jump(unreachable, exit);

    MethodBody::new("ContradictoryChecks", b.build().expect("fixture CFG is valid"), symbols)
        .with_parameters(vec![x])
}

/// ```text
/// void M(object x) {
///     x?.M();       // NullCheck terminator, x stays on the stack
///     (else branch) x.ToString();
/// }
/// ```
pub fn fixture_null_check_split(deref_on_null: bool) -> MethodBody {
    let mut symbols = SymbolTable::new();
    let x = symbols.parameter("x", Nullability::Unknown);

    let mut b = CfgBuilder::new();
    let entry = b.block(vec![Instruction::load(x)], Terminator::NullCheck);
    let on_null = if deref_on_null {
        vec![Instruction::member("ToString"), Instruction::pop()]
    } else {
        vec![Instruction::pop()]
    };
    let null_side = b.block(on_null, Terminator::Return { has_value: false });
    let not_null_side = b.block(
        vec![Instruction::call(MethodRef::new("M"), 0), Instruction::pop()],
        Terminator::Return { has_value: false },
    );
    b.edge(entry, null_side, CfgEdgeKind::NullBranch)
        .edge(entry, not_null_side, CfgEdgeKind::NotNullBranch);

    MethodBody::new("NullConditional", b.build().expect("fixture CFG is valid"), symbols)
        .with_parameters(vec![x])
}

/// ```text
/// void M() {
///     var s = new Stream();
///     s.Dispose();
///     s.Read();
/// }
/// ```
pub fn fixture_use_after_dispose() -> MethodBody {
    let mut symbols = SymbolTable::new();
    let s = symbols.local("s");

    let mut instructions = vec![Instruction::new_object("Stream", 0), Instruction::assign(s)];
    instructions.extend([
        Instruction::load(s),
        Instruction::call(MethodRef::dispose(), 0),
        Instruction::pop(),
    ]);
    instructions.extend(call_on(s, "Read"));

    let mut b = CfgBuilder::new();
    b.block(instructions, Terminator::Return { has_value: false });
    MethodBody::new("UseAfterDispose", b.build().expect("fixture CFG is valid"), symbols)
}

/// ```text
/// void M(bool flag) {
///     var s = new Stream();
///     if (flag) { s.Dispose(); }
///     s.Dispose();
/// }
/// ```
pub fn fixture_conditional_double_dispose() -> MethodBody {
    let mut symbols = SymbolTable::new();
    let flag = symbols.parameter("flag", Nullability::NotNull);
    let s = symbols.local("s");

    let dispose = || {
        vec![
            Instruction::load(s),
            Instruction::call(MethodRef::dispose(), 0),
            Instruction::pop(),
        ]
    };

    let mut b = CfgBuilder::new();
    let entry = b.block(
        vec![Instruction::new_object("Stream", 0), Instruction::assign(s), Instruction::load(flag)],
        Terminator::Conditional,
    );
    let then = b.block(dispose(), Terminator::Jump);
    let tail = b.block(dispose(), Terminator::Return { has_value: false });
    b.branch(entry, then, tail).jump(then, tail);

    MethodBody::new("ConditionalDispose", b.build().expect("fixture CFG is valid"), symbols)
        .with_parameters(vec![flag])
}

/// ```text
/// void M(object x) {
///     try { x.M(); } catch { }
/// }
/// ```
pub fn fixture_try_catch() -> MethodBody {
    let mut symbols = SymbolTable::new();
    let x = symbols.parameter("x", Nullability::Unknown);

    let mut b = CfgBuilder::new();
    let body = b.block(call_on(x, "M"), Terminator::Jump);
    let handler = b.block(vec![], Terminator::Jump);
    let exit = b.block(vec![], Terminator::Return { has_value: false });
    b.jump(body, exit)
        .edge(body, handler, CfgEdgeKind::Exception)
        .jump(handler, exit);

    MethodBody::new("TryCatch", b.build().expect("fixture CFG is valid"), symbols).with_parameters(vec![x])
}

/// Chain of `depth` independent `if (p_k == null)` diamonds over `depth`
/// parameters; the number of paths doubles with every diamond.
pub fn fixture_branch_ladder(depth: usize) -> MethodBody {
    let mut symbols = SymbolTable::new();
    let parameters: Vec<SymbolId> = (0..depth)
        .map(|k| symbols.parameter(&format!("p{k}"), Nullability::Unknown))
        .collect();

    let mut b = CfgBuilder::new();
    let mut previous: Option<BlockId> = None;
    for p in &parameters {
        let test = b.block(
            vec![Instruction::load(*p), Instruction::null(), Instruction::eq()],
            Terminator::Conditional,
        );
        if let Some(prev) = previous {
            b.jump(prev, test);
        }
        let then = b.block(vec![Instruction::nop()], Terminator::Jump);
        let join = b.block(vec![], Terminator::Jump);
        b.branch(test, then, join).jump(then, join);
        previous = Some(join);
    }
    let exit = b.block(vec![], Terminator::Exit);
    if let Some(prev) = previous {
        b.jump(prev, exit);
    }

    MethodBody::new("BranchLadder", b.build().expect("fixture CFG is valid"), symbols).with_parameters(parameters)
}

/// ```text
/// void M() {
///     this.Dispose();
///     goto next;
/// next:
///     var n = this.Length;
/// }
/// ```
pub fn fixture_this_disposed_across_blocks() -> MethodBody {
    let mut b = CfgBuilder::new();
    let dispose = b.block(
        vec![
            Instruction::this(),
            Instruction::call(MethodRef::dispose(), 0),
            Instruction::pop(),
        ],
        Terminator::Jump,
    );
    let access = b.block(
        vec![Instruction::this(), Instruction::member("Length"), Instruction::pop()],
        Terminator::Exit,
    );
    b.jump(dispose, access);
    MethodBody::new("DisposeThis", b.build().expect("fixture CFG is valid"), SymbolTable::new())
}

/// ```text
/// void M() {
///     object x = null;
///     var y = x;
///     y.M();
/// }
/// ```
pub fn fixture_aliased_null_access() -> MethodBody {
    let mut symbols = SymbolTable::new();
    let x = symbols.local("x");
    let y = symbols.local("y");

    let mut instructions = vec![
        Instruction::null(),
        Instruction::assign(x),
        Instruction::load(x),
        Instruction::assign(y),
    ];
    instructions.extend(call_on(y, "M"));

    let mut b = CfgBuilder::new();
    b.block(instructions, Terminator::Return { has_value: false });
    MethodBody::new("AliasedNullAccess", b.build().expect("fixture CFG is valid"), symbols)
}
