//! 编辑器宿主契约：widget 子系统依赖的外部协作方

use crate::kernel::control::Zle;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierFlags: u32 {
        /// 用户显式给出了数值参数。
        const MULT = 1 << 0;
    }
}

/// 分发时生效的数值前缀。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifier {
    pub mult: i32,
    pub flags: ModifierFlags,
}

impl Default for Modifier {
    fn default() -> Self {
        Self {
            mult: 1,
            flags: ModifierFlags::empty(),
        }
    }
}

impl Modifier {
    pub fn with_mult(mult: i32) -> Self {
        Self {
            mult,
            flags: ModifierFlags::MULT,
        }
    }

    pub fn has_mult(&self) -> bool {
        self.flags.contains(ModifierFlags::MULT)
    }
}

/// `zle -R` 的一次重绘请求。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshRequest {
    /// 临时状态行。
    pub status: Option<String>,
    /// 显示在编辑行下方的列表。
    pub list: Vec<String>,
    /// 清除之前显示的列表。
    pub clear_list: bool,
    /// 不带参数的 `-Rc`：即使宿主认为没有显示列表，也按已显示处理并清除。
    pub list_shown: bool,
}

pub trait EditorHost {
    /// 编辑器当前是否处于行编辑会话中。
    fn is_active(&self) -> bool;

    /// 是否正处于补全回调中（此时不可重入调用 widget）。
    fn in_completion(&self) -> bool;

    /// 当前是否在某个 widget 的执行过程中。
    fn in_widget(&self) -> bool;

    /// widget 开始执行；可嵌套，与 `end_widget` 成对调用。
    fn begin_widget(&mut self);

    fn end_widget(&mut self);

    /// 调用解释器函数，返回其退出状态。函数体可以经由 `zle` 重入命令接口。
    fn call_function(&mut self, zle: &mut Zle, name: &str, args: &[String]) -> i32;

    fn begin_completion(&mut self, function: &str);

    fn end_completion(&mut self);

    fn modifier(&self) -> Modifier;

    fn set_modifier(&mut self, modifier: Modifier);

    fn current_keymap(&self) -> String;

    /// 切换当前 keymap；名字未知时返回 `false`。
    fn select_keymap(&mut self, name: &str) -> bool;

    fn refresh(&mut self, request: &RefreshRequest);

    fn show_message(&mut self, message: &str);

    /// 把一个字节压回待读输入的最前面。
    fn unget_byte(&mut self, byte: u8);

    fn is_trashed(&self) -> bool;

    /// 清掉当前显示，使外部命令可以安全输出。
    fn trash(&mut self);

    /// widget 当前是否可调用。
    fn is_usable(&self) -> bool {
        self.is_active() && !self.in_completion()
    }
}
