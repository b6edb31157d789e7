use super::TemplateUsage;

/// Built-in English patterns for each usage.
pub(super) fn default_patterns(usage: TemplateUsage) -> &'static [&'static str] {
    use TemplateUsage as U;
    match usage {
        U::Bool => &["Would you like {&}? {||}"],
        U::BoolHelp => &["Please enter 'yes' or 'no'."],
        U::Clarify => &["By \"{0}\" {&} did you mean {||}"],
        U::Confirmation => &["Is this your selection?\n{*}"],
        U::CurrentChoice => &["(current choice: {})"],
        U::DateTime => &["Please enter a date and time for {&} {||}"],
        U::DateTimeHelp => &["Please enter a date or time such as 'tomorrow at 6pm', '2024-07-04', or '18:30'."],
        U::Double => &["Please enter a number{? between {0} and {1}} for {&} {||}"],
        U::DoubleHelp => &["Please enter a number{? between {0} and {1}}."],
        U::EnumOneNumberHelp => &["You can enter a number {0}-{1} or words from the descriptions. ({2})"],
        U::EnumManyNumberHelp => {
            &["You can enter one or more selections from numbers {0}-{1} or words from the descriptions. ({2})"]
        }
        U::EnumOneWordHelp => &["You can enter any words from the descriptions. ({2})"],
        U::EnumManyWordHelp => &["You can enter one or more selections from words in the descriptions. ({2})"],
        U::EnumSelectOne => &["Please select a {&} {||}"],
        U::EnumSelectMany => &["Please select one or more {&} {||}"],
        U::Feedback => &["For {&} I understood {}. {?\"{0}\" is not an option.}"],
        U::Help => &["* You are filling in the {&} field. Possible responses:\n{0}\n{1}\n{2}"],
        U::HelpClarify => &["* You are clarifying a {&} value. Possible responses:\n{0}\n{1}"],
        U::HelpConfirm => &["* Please answer the question. Possible responses:\n{0}\n{1}"],
        U::HelpNavigation => &["* Choose what field to change. Possible responses:\n{0}\n{1}"],
        U::Integer => &["Please enter a number{? between {0} and {1}} for {&} {||}"],
        U::IntegerHelp => &["You can enter a number{? between {0} and {1}}."],
        U::Navigation => &["What do you want to change?\n{||}"],
        U::NavigationCommandHelp => &["You can switch to another field by entering its name. ({0})."],
        U::NavigationFormat => &["{&}{? ({})}"],
        U::NavigationHelp => &["Choose {?a number from {0}, or }a field name."],
        U::NoPreference => &["No Preference"],
        U::NotUnderstood => &[
            "\"{0}\" is not a{? {&}} option.",
            "I do not understand \"{0}\".",
            "Sorry, I didn't understand \"{0}\".",
        ],
        U::NoPrevious => &["There is no previous question to go back to."],
        U::OutOfRange => &["\"{0}\" is not allowed for {&}{?; enter a value between {1} and {2}}."],
        U::Status => &["{*}"],
        U::StatusFormat => &["{&}: {}"],
        U::String => &["Please enter {&} {||}"],
        U::StringHelp => &["You can enter anything{? up to {1} characters}."],
        U::Unspecified => &["Unspecified"],
        U::CommandHelp => &["Commands: {0}."],
        U::Cancelled => &["Form cancelled."],
        U::Completed => &["Thanks, your form is complete."],
    }
}
