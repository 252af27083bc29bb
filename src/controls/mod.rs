/*
 * Win32 control handlers. `subclass` attaches message interceptors to native
 * sub-windows; `combobox_handler` binds the autocomplete core to a real
 * editable combobox.
 */
pub mod combobox_handler;
pub mod subclass;
